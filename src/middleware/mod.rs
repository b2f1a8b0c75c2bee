//! Request extractors shared by the HTTP handlers.

pub mod auth;
pub mod json;

pub use auth::CurrentUser;
pub use json::ValidatedJson;
