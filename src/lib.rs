//! User registration, login and profile service.
//!
//! Passwords are stored as argon2 hashes; sessions are stateless HS256
//! access tokens resolved to a user on every protected request.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, MethodRouter};
use handlers::http;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router. Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/register", json_405(post(auth::register)))
        .route("/login", json_405(post(auth::login)))
        .route("/logout", json_405(post(auth::logout)))
        .route(
            "/profile",
            json_405(get(http::get_profile).put(http::update_profile)),
        )
        .route("/protected", json_405(get(http::protected)))
        .route("/health", json_405(get(http::health)))
        .fallback(http::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Answer unsupported methods on a known path with the JSON error body.
fn json_405(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(http::method_not_allowed)
}

/// CORS for the configured browser origins. Credentials are not allowed;
/// the token travels in the `Authorization` header.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
