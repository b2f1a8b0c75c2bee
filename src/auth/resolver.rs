//! Resolves an `Authorization` header to the requesting user.

use uuid::Uuid;

use super::jwt::{TokenError, TokenService};
use crate::db::UserStore;
use crate::error::{AppError, AppResult};
use crate::models::Principal;

/// Why a request was not authorized. Clients only ever see a 401; the
/// variant is kept for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("invalid token: {0}")]
    InvalidToken(TokenError),
    #[error("token has no usable subject")]
    MissingSubject,
    #[error("token subject does not match a user")]
    UnknownPrincipal,
}

impl AuthFailure {
    pub const INVALID_TOKEN_MESSAGE: &'static str = "Invalid or expired token";

    /// Client-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::MissingHeader => "Missing Authorization: Bearer <token> header",
            AuthFailure::MalformedHeader => "Malformed Authorization header, expected: Bearer <token>",
            AuthFailure::InvalidToken(_) => Self::INVALID_TOKEN_MESSAGE,
            AuthFailure::MissingSubject => "Invalid token payload",
            AuthFailure::UnknownPrincipal => "User not found for token",
        }
    }
}

/// Extract the token from `Bearer <token>`. The scheme is case-insensitive
/// and the header must be exactly two space-separated parts.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthFailure> {
    let header = header.map(str::trim).unwrap_or_default();
    if header.is_empty() {
        return Err(AuthFailure::MissingHeader);
    }
    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthFailure::MalformedHeader)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(char::is_whitespace)
    {
        return Err(AuthFailure::MalformedHeader);
    }
    Ok(token)
}

/// Run the full header -> token -> subject -> user chain.
pub async fn resolve_principal(
    tokens: &TokenService,
    store: &dyn UserStore,
    header: Option<&str>,
) -> AppResult<Principal> {
    let token = bearer_token(header)?;
    let claims = tokens
        .validate(token)
        .map_err(AuthFailure::InvalidToken)?;

    let user_id = claims
        .sub
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(AuthFailure::MissingSubject)?;

    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthorized(AuthFailure::UnknownPrincipal))?;
    Ok(Principal::from(user))
}
