//! Auth HTTP handlers: register, login, logout.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{LoginGrant, NewAccount};
use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::ValidatedJson;
use crate::models::Principal;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(max = 120))]
    pub display_name: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Principal>), AppError> {
    let principal = state
        .accounts()
        .register(NewAccount {
            email: body.email,
            password: body.password,
            display_name: body.display_name,
            bio: body.bio,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(principal)))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginGrant>, AppError> {
    let grant = state.accounts().login(&body.email, &body.password).await?;
    Ok(Json(grant))
}

/// POST /logout. Acknowledges only; the token stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: state.accounts().logout().to_string(),
    })
}
