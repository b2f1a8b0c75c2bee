//! HTTP handlers: profile, protected example, health, unknown routes and methods.

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::{Method, StatusCode},
    Json,
};
use serde_json::json;

use crate::auth::{AccountService, MessageResponse, TokenService};
use crate::db::UserStore;
use crate::error::AppError;
use crate::middleware::{CurrentUser, ValidatedJson};
use crate::models::{Principal, ProfileUpdate};

/// Shared application state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub tokens: TokenService,
    pub store: Arc<dyn UserStore>,
}

impl AppState {
    /// Wire the services around one store and one token configuration.
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self {
            accounts: AccountService::new(store.clone(), tokens.clone()),
            tokens,
            store,
        }
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
    pub fn store(&self) -> &dyn UserStore {
        &*self.store
    }
}

/// GET /profile
pub async fn get_profile(CurrentUser(principal): CurrentUser) -> Json<Principal> {
    Json(principal)
}

/// PUT /profile — only fields present in the body change; `null` clears.
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    ValidatedJson(update): ValidatedJson<ProfileUpdate>,
) -> Result<Json<Principal>, AppError> {
    let updated = state.accounts().update_profile(&principal, &update).await?;
    Ok(Json(updated))
}

/// GET /protected — example route that needs a valid token.
pub async fn protected(CurrentUser(principal): CurrentUser) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!(
            "Hello, {}. You have access to protected data.",
            principal.email
        ),
    })
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "profiled" })),
    )
}

/// Fallback for unmatched routes.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    tracing::debug!(path = %uri.path(), "no route");
    AppError::NotFound("Route not found".to_string())
}

/// Fallback for a known route called with a method it does not serve.
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> AppError {
    tracing::debug!(%method, path = %uri.path(), "method not allowed");
    AppError::MethodNotAllowed
}
