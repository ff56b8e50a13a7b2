#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use staffing_api::app::{app, AppState};
use staffing_api::config::AppConfig;
use staffing_api::database::models::{CurriculumTemplate, Section, Subject, Teacher};
use staffing_api::database::Stores;
use staffing_api::services::{
    Caller, SectionInput, StaffingService, SubjectInput, TeacherInput, TemplateInput,
};
use staffing_api::types::Shift;

/// Memory-backed service for core-level tests
pub fn service() -> StaffingService {
    StaffingService::new(Stores::memory())
}

pub fn caller() -> Caller {
    let owner_id = Uuid::new_v4();
    Caller {
        owner_id,
        email: format!("{}@example.com", owner_id.simple()),
    }
}

pub async fn teacher(service: &StaffingService, caller: &Caller, name: &str, rt_hours: i32) -> Result<Teacher> {
    let input = TeacherInput {
        name: name.to_string(),
        rt_hours,
        shift: None,
    };
    Ok(service.create_teacher(caller, input).await?)
}

pub async fn subject(service: &StaffingService, caller: &Caller, name: &str, period_load: i32) -> Result<Subject> {
    let input = SubjectInput {
        name: name.to_string(),
        period_load,
    };
    Ok(service.create_subject(caller, input).await?)
}

pub async fn template(
    service: &StaffingService,
    caller: &Caller,
    capacity: i32,
    shift: Shift,
) -> Result<CurriculumTemplate> {
    let input = TemplateInput {
        category: "Regular".to_string(),
        total_period_capacity: capacity,
        shift,
    };
    Ok(service.create_template(caller, input).await?)
}

pub async fn section(service: &StaffingService, caller: &Caller, name: &str, template_id: Uuid) -> Result<Section> {
    let input = SectionInput {
        name: name.to_string(),
        template_id,
    };
    Ok(service.create_section(caller, input).await?)
}

/// Drives the full router in-process
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new() -> Self {
        let config = AppConfig::development();
        let state = AppState::new(Stores::memory(), config.security.clone());
        Self {
            router: app(state, &config),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => request.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok((status, value))
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, path, Some(token), None).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, path, Some(token), None).await
    }

    /// Register an owner and return a bearer token for it
    pub async fn login_as(&self, email: &str) -> Result<String> {
        let password = "Secret#123";
        let (status, _) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "name": "Owner", "email": email, "password": password })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register returned {}", status);

        let (status, body) = self
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login returned {}", status);

        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }
}

/// `data.id` of a success envelope
pub fn id_of(body: &Value) -> Result<String> {
    body["data"]["id"]
        .as_str()
        .map(str::to_string)
        .context("response has no data.id")
}
