// handlers/mod.rs - HTTP handlers
//
// public/    token acquisition, no bearer token required
// protected/ /api/* routes, every handler resolves an AuthCaller first

pub mod protected;
pub mod public;
