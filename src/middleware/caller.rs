use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::app::AppState;
use crate::auth::Principal;
use crate::error::ApiError;
use crate::services::Caller;

/// Extractor resolving the request's [`Principal`] to an owner.
/// Fails with 401 when no principal is present or no owner matches it.
#[derive(Debug, Clone)]
pub struct AuthCaller(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AuthCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let principal = parts.extensions.get::<Principal>().cloned();
        let caller = state.staffing.resolve(principal.as_ref()).await?;
        Ok(AuthCaller(caller))
    }
}
