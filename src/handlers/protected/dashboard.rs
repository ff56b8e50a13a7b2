use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthCaller};
use crate::services::reports::TenantStatistics;

/// GET /api/dashboard - Entity counts for the caller
pub async fn statistics(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<TenantStatistics> {
    let stats = state.staffing.statistics(&caller).await?;
    Ok(ApiResponse::success(stats))
}
