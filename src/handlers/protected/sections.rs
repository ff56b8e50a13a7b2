use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Section;
use crate::middleware::{ApiResponse, ApiResult, AuthCaller};
use crate::services::SectionInput;

pub async fn list(State(state): State<AppState>, AuthCaller(caller): AuthCaller) -> ApiResult<Vec<Section>> {
    Ok(ApiResponse::success(state.staffing.list_sections(&caller).await?))
}

/// POST /api/sections - `template_id` must name one of the caller's templates
pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(input): Json<SectionInput>,
) -> ApiResult<Section> {
    Ok(ApiResponse::created(state.staffing.create_section(&caller, input).await?))
}

pub async fn show(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> ApiResult<Section> {
    Ok(ApiResponse::success(state.staffing.get_section(&caller, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
    Json(input): Json<SectionInput>,
) -> ApiResult<Section> {
    Ok(ApiResponse::success(state.staffing.update_section(&caller, id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.staffing.delete_section(&caller, id).await?;
    Ok(ApiResponse::no_content())
}
