use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{validate_jwt, Principal};

/// Attaches a [`Principal`] to the request when it carries a valid bearer
/// token. Requests without one pass through untouched; protected handlers
/// reject them when resolving the caller.
pub async fn jwt_auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match extract_jwt_from_headers(request.headers()) {
        Ok(Some(token)) => match validate_jwt(state.security(), &token) {
            Ok(claims) => {
                request.extensions_mut().insert(Principal { email: claims.sub });
            }
            Err(e) => tracing::debug!("Ignoring bearer token: {}", e),
        },
        Ok(None) => {}
        Err(msg) => tracing::debug!("Ignoring Authorization header: {}", msg),
    }

    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if token.trim().is_empty() => Err("Empty JWT token".to_string()),
        Some(token) => Ok(Some(token.trim().to_string())),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
