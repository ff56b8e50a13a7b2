use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::Stores;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::services::{AccountService, StaffingService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub staffing: Arc<StaffingService>,
    pub accounts: Arc<AccountService>,
}

impl AppState {
    pub fn new(stores: Stores, security: SecurityConfig) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(stores.owners.clone(), security)),
            staffing: Arc::new(StaffingService::new(stores)),
        }
    }

    pub fn security(&self) -> &SecurityConfig {
        self.accounts.security()
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(auth_routes())
        .merge(teacher_routes())
        .merge(subject_routes())
        .merge(section_routes())
        .merge(template_routes())
        .merge(report_routes())
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

fn auth_routes() -> Router<AppState> {
    use handlers::protected::auth;

    Router::new().route("/api/auth/whoami", get(auth::whoami))
}

fn teacher_routes() -> Router<AppState> {
    use handlers::protected::teachers;

    Router::new()
        .route("/api/teachers", get(teachers::list).post(teachers::create))
        .route(
            "/api/teachers/:id",
            get(teachers::show).put(teachers::update).delete(teachers::delete),
        )
        .route("/api/teachers/:id/workload", get(teachers::workload))
        .route(
            "/api/teachers/:id/templates/:template_id",
            put(teachers::join_template).delete(teachers::leave_template),
        )
}

fn subject_routes() -> Router<AppState> {
    use handlers::protected::subjects;

    Router::new()
        .route("/api/subjects", get(subjects::list).post(subjects::create))
        .route(
            "/api/subjects/:id",
            get(subjects::show).put(subjects::update).delete(subjects::delete),
        )
        .route(
            "/api/subjects/:id/teachers/:teacher_id",
            put(subjects::link_teacher).delete(subjects::unlink_teacher),
        )
        .route(
            "/api/subjects/:id/sections/:section_id",
            put(subjects::attach_section).delete(subjects::detach_section),
        )
}

fn section_routes() -> Router<AppState> {
    use handlers::protected::sections;

    Router::new()
        .route("/api/sections", get(sections::list).post(sections::create))
        .route(
            "/api/sections/:id",
            get(sections::show).put(sections::update).delete(sections::delete),
        )
}

fn template_routes() -> Router<AppState> {
    use handlers::protected::templates;

    Router::new()
        .route("/api/templates", get(templates::list).post(templates::create))
        .route(
            "/api/templates/:id",
            get(templates::show).put(templates::update).delete(templates::delete),
        )
        .route(
            "/api/templates/:id/sections",
            get(templates::sections).post(templates::create_section),
        )
}

fn report_routes() -> Router<AppState> {
    use handlers::protected::{dashboard, reports};

    Router::new()
        .route("/api/reports/overload", get(reports::overload))
        .route("/api/reports/teachers", get(reports::teacher_summary))
        .route("/api/reports/roster", get(reports::roster))
        .route("/api/reports/detail", get(reports::detail))
        .route("/api/reports/shifts", get(reports::shift_distribution))
        .route("/api/dashboard", get(dashboard::statistics))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Staffing API",
            "version": version,
            "description": "School staffing backend: teaching-load capacity and overload reporting",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/register, /auth/login (public - token acquisition)",
                "auth": "/api/auth/whoami (protected)",
                "teachers": "/api/teachers[/:id[/workload|/templates/:template_id]] (protected)",
                "subjects": "/api/subjects[/:id[/teachers/:teacher_id|/sections/:section_id]] (protected)",
                "sections": "/api/sections[/:id] (protected)",
                "templates": "/api/templates[/:id[/sections]] (protected)",
                "reports": "/api/reports/{overload,teachers,roster,detail,shifts} (protected)",
                "dashboard": "/api/dashboard (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.staffing.stores().relations.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
