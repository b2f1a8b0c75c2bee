//! Account application service: register, login, logout, profile updates.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::jwt::TokenService;
use super::password::{hash_password, verify_password};
use crate::db::UserStore;
use crate::error::{AppError, AppResult};
use crate::models::{normalize_email, NewUser, Principal, ProfileUpdate};

/// Registration input. The password only lives as long as this value.
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

/// Result of a successful login.
#[derive(Debug, Serialize)]
pub struct LoginGrant {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in_minutes: i64,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Create an account. Duplicate emails are detected by the store's
    /// uniqueness constraint, not by a lookup beforehand.
    pub async fn register(&self, account: NewAccount) -> AppResult<Principal> {
        let NewAccount {
            email,
            password,
            display_name,
            bio,
        } = account;
        let email = normalize_email(&email);
        let password_hash = run_blocking(move || hash_password(&password)).await??;

        let user = self
            .store
            .create_user(NewUser {
                email,
                password_hash,
                display_name,
                bio,
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(Principal::from(user))
    }

    /// Check credentials and issue an access token. An unknown email and a
    /// wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginGrant> {
        let email = normalize_email(email);
        let Some(user) = self.store.find_by_email(&email).await? else {
            debug!("login rejected: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        if !run_blocking(move || verify_password(&password, &stored_hash)).await? {
            debug!(user_id = %user.id, "login rejected: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(&user.id.to_string())?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginGrant {
            access_token,
            token_type: "Bearer",
            expires_in_minutes: self.tokens.expiry_minutes(),
        })
    }

    /// Tokens are stateless, so there is nothing to end on the server: the
    /// client drops its token and it stays valid until it expires. Adding
    /// server-side state here would change the token model.
    pub fn logout(&self) -> &'static str {
        "Logged out (client should delete token)."
    }

    pub async fn update_profile(
        &self,
        principal: &Principal,
        update: &ProfileUpdate,
    ) -> AppResult<Principal> {
        let user = self
            .store
            .update_profile(principal.id, update)
            .await?
            .ok_or(AppError::Unauthorized(super::AuthFailure::UnknownPrincipal))?;
        info!(user_id = %user.id, "profile updated");
        Ok(Principal::from(user))
    }
}

/// Argon2 is deliberately slow; keep it off the async worker threads.
async fn run_blocking<F, T>(f: F) -> AppResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("blocking task: {}", e)))
}
