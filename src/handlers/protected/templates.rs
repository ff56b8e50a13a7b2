// handlers/protected/templates.rs - /api/templates

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{CurriculumTemplate, Section};
use crate::middleware::{ApiResponse, ApiResult, AuthCaller};
use crate::services::{SectionInput, TemplateInput};

#[derive(Debug, Deserialize)]
pub struct NewSection {
    pub name: String,
}

pub async fn list(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<CurriculumTemplate>> {
    Ok(ApiResponse::success(state.staffing.list_templates(&caller).await?))
}

/// POST /api/templates
///
/// ```json
/// { "category": "Regular", "total_period_capacity": 30, "shift": "MORNING" }
/// ```
pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(input): Json<TemplateInput>,
) -> ApiResult<CurriculumTemplate> {
    Ok(ApiResponse::created(state.staffing.create_template(&caller, input).await?))
}

pub async fn show(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> ApiResult<CurriculumTemplate> {
    Ok(ApiResponse::success(state.staffing.get_template(&caller, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
    Json(input): Json<TemplateInput>,
) -> ApiResult<CurriculumTemplate> {
    Ok(ApiResponse::success(state.staffing.update_template(&caller, id, input).await?))
}

/// DELETE /api/templates/:id - Cascades to the template's sections
pub async fn delete(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.staffing.delete_template(&caller, id).await?;
    Ok(ApiResponse::no_content())
}

pub async fn sections(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Section>> {
    Ok(ApiResponse::success(state.staffing.sections_of_template(&caller, id).await?))
}

/// POST /api/templates/:id/sections - Create a section under this template
pub async fn create_section(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
    Json(body): Json<NewSection>,
) -> ApiResult<Section> {
    let input = SectionInput {
        name: body.name,
        template_id: id,
    };
    Ok(ApiResponse::created(state.staffing.create_section(&caller, input).await?))
}
