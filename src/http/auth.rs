use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderName;

use crate::http::AppError;
use crate::AppState;

/// Proof that the caller presented the shared service token. When no
/// token is configured (local development) the check is skipped.
#[derive(Debug, Clone)]
pub struct ServiceToken;

const SERVICE_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-service-token");

#[axum::async_trait]
impl FromRequestParts<AppState> for ServiceToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.service_token.as_ref() else {
            return Ok(ServiceToken);
        };

        let provided = parts
            .headers
            .get(SERVICE_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::forbidden("missing service token"))?;

        if provided != expected {
            return Err(AppError::forbidden("invalid service token"));
        }

        Ok(ServiceToken)
    }
}
