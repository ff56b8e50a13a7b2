// handlers/protected/subjects.rs - /api/subjects

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Subject;
use crate::middleware::{ApiResponse, ApiResult, AuthCaller};
use crate::services::{AttachOutcome, LinkOutcome, SubjectInput};

pub async fn list(State(state): State<AppState>, AuthCaller(caller): AuthCaller) -> ApiResult<Vec<Subject>> {
    Ok(ApiResponse::success(state.staffing.list_subjects(&caller).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Json(input): Json<SubjectInput>,
) -> ApiResult<Subject> {
    Ok(ApiResponse::created(state.staffing.create_subject(&caller, input).await?))
}

pub async fn show(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> ApiResult<Subject> {
    Ok(ApiResponse::success(state.staffing.get_subject(&caller, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
    Json(input): Json<SubjectInput>,
) -> ApiResult<Subject> {
    Ok(ApiResponse::success(state.staffing.update_subject(&caller, id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.staffing.delete_subject(&caller, id).await?;
    Ok(ApiResponse::no_content())
}

pub async fn link_teacher(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path((id, teacher_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<LinkOutcome> {
    Ok(ApiResponse::success(
        state.staffing.link_subject_teacher(&caller, id, teacher_id).await?,
    ))
}

pub async fn unlink_teacher(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path((id, teacher_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<LinkOutcome> {
    Ok(ApiResponse::success(
        state.staffing.unlink_subject_teacher(&caller, id, teacher_id).await?,
    ))
}

/// PUT /api/subjects/:id/sections/:section_id - Attach under the section's period budget
///
/// 422 with `attached_total`, `requested_total` and `capacity` when the
/// section cannot take the subject's load.
pub async fn attach_section(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path((id, section_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<AttachOutcome> {
    Ok(ApiResponse::success(
        state.staffing.attach_subject(&caller, id, section_id).await?,
    ))
}

pub async fn detach_section(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
    Path((id, section_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<LinkOutcome> {
    Ok(ApiResponse::success(
        state.staffing.detach_subject(&caller, id, section_id).await?,
    ))
}
