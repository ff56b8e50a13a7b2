// handlers/protected/teachers.rs - /api/teachers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Teacher;
use crate::middleware::{ApiResponse, ApiResult, AuthCaller};
use crate::services::{LinkOutcome, TeacherInput, TeacherWorkload};

pub async fn list(State(state): State<AppState>, AuthCaller(caller): AuthCaller) -> ApiResult<Vec<Teacher>> {
    Ok(ApiResponse::success(state.staffing.list_teachers(&caller).await?))
}

/// POST /api/teachers
///
/// ```json
/// { "name": "Ana", "rt_hours": 30, "shift": "morning" }
/// ```
pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(input): Json<TeacherInput>,
) -> ApiResult<Teacher> {
    Ok(ApiResponse::created(state.staffing.create_teacher(&caller, input).await?))
}

pub async fn show(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> ApiResult<Teacher> {
    Ok(ApiResponse::success(state.staffing.get_teacher(&caller, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
    Json(input): Json<TeacherInput>,
) -> ApiResult<Teacher> {
    Ok(ApiResponse::success(state.staffing.update_teacher(&caller, id, input).await?))
}

/// DELETE /api/teachers/:id - Also removes the teacher from every subject and template
pub async fn delete(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.staffing.delete_teacher(&caller, id).await?;
    Ok(ApiResponse::no_content())
}

/// GET /api/teachers/:id/workload - Budget against assigned subjects
pub async fn workload(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> ApiResult<TeacherWorkload> {
    Ok(ApiResponse::success(state.staffing.teacher_workload(&caller, id).await?))
}

/// PUT /api/teachers/:id/templates/:template_id - Direct template membership
pub async fn join_template(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path((id, template_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<LinkOutcome> {
    Ok(ApiResponse::success(
        state.staffing.link_teacher_template(&caller, id, template_id).await?,
    ))
}

pub async fn leave_template(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path((id, template_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<LinkOutcome> {
    Ok(ApiResponse::success(
        state.staffing.unlink_teacher_template(&caller, id, template_id).await?,
    ))
}
