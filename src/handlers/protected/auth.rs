use axum::extract::State;

use crate::app::AppState;
use crate::database::models::Owner;
use crate::middleware::{ApiResponse, ApiResult, AuthCaller};

/// GET /api/auth/whoami - The owner behind the bearer token
pub async fn whoami(State(state): State<AppState>, AuthCaller(caller): AuthCaller) -> ApiResult<Owner> {
    let owner = state.accounts.whoami(&caller).await?;
    Ok(ApiResponse::success(owner))
}
