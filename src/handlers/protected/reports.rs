// handlers/protected/reports.rs - GET /api/reports/*
//
// Every report is recomputed from a fresh snapshot of the caller's graph.

use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthCaller};
use crate::services::reports::{DetailRow, OverloadRow, RosterRow, ShiftDistributionRow, TeacherSummaryRow};

/// GET /api/reports/overload - Teachers assigned more periods than their budget
pub async fn overload(State(state): State<AppState>, AuthCaller(caller): AuthCaller) -> ApiResult<Vec<OverloadRow>> {
    Ok(ApiResponse::success(state.staffing.overload_report(&caller).await?))
}

/// GET /api/reports/teachers - Budget, assigned and remaining periods per teacher
pub async fn teacher_summary(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<TeacherSummaryRow>> {
    Ok(ApiResponse::success(state.staffing.teacher_summary_report(&caller).await?))
}

/// GET /api/reports/roster - Teacher names per curriculum template
pub async fn roster(State(state): State<AppState>, AuthCaller(caller): AuthCaller) -> ApiResult<Vec<RosterRow>> {
    Ok(ApiResponse::success(state.staffing.roster_report(&caller).await?))
}

/// GET /api/reports/detail - One row per template, section and subject
pub async fn detail(State(state): State<AppState>, AuthCaller(caller): AuthCaller) -> ApiResult<Vec<DetailRow>> {
    Ok(ApiResponse::success(state.staffing.detail_report(&caller).await?))
}

/// GET /api/reports/shifts - Periods per teacher and shift
pub async fn shift_distribution(
    State(state): State<AppState>,
    AuthCaller(caller): AuthCaller,
) -> ApiResult<Vec<ShiftDistributionRow>> {
    Ok(ApiResponse::success(state.staffing.shift_distribution_report(&caller).await?))
}
