// handlers/public/auth.rs - POST /auth/register, POST /auth/login

use axum::{extract::State, Json};

use crate::app::AppState;
use crate::database::models::Owner;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LoginInput, RegisterInput, Session};

/// POST /auth/register - Create an owner account
///
/// Expected Input:
/// ```json
/// { "name": "Escola Municipal", "email": "admin@school.org", "password": "Secret#123" }
/// ```
///
/// Fails with 400 on a malformed email, a weak password, or an email that
/// is already registered.
pub async fn register(State(state): State<AppState>, Json(input): Json<RegisterInput>) -> ApiResult<Owner> {
    let owner = state.accounts.register(input).await?;
    Ok(ApiResponse::created(owner))
}

/// POST /auth/login - Exchange credentials for a bearer token
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": { "token": "eyJhbGciOiJIUzI1NiI...", "expires_in": 86400, "owner": { ... } }
/// }
/// ```
pub async fn login(State(state): State<AppState>, Json(input): Json<LoginInput>) -> ApiResult<Session> {
    let session = state.accounts.login(input).await?;
    Ok(ApiResponse::success(session))
}
