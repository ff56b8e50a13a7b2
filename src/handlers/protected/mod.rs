pub mod auth;
pub mod dashboard;
pub mod reports;
pub mod sections;
pub mod subjects;
pub mod teachers;
pub mod templates;
