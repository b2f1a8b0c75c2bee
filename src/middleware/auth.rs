//! Auth extractor: resolves the bearer token to the current user.

use axum::http::header::AUTHORIZATION;
use tracing::debug;

use crate::auth::{resolve_principal, AuthFailure};
use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::models::Principal;

/// Extractor: the authenticated user behind `Authorization: Bearer <token>`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Principal);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let resolved = match parts.headers.get(AUTHORIZATION).map(|v| v.to_str()) {
            Some(Err(_)) => Err(AppError::Unauthorized(AuthFailure::MalformedHeader)),
            header => {
                resolve_principal(state.tokens(), state.store(), header.and_then(Result::ok)).await
            }
        };

        match resolved {
            Ok(principal) => Ok(CurrentUser(principal)),
            Err(AppError::Unauthorized(reason)) => {
                debug!(path = %parts.uri.path(), reason = %reason, "request not authorized");
                Err(AppError::Unauthorized(reason))
            }
            Err(e) => Err(e),
        }
    }
}
