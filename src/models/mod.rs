//! Data models for users and profiles.

pub mod user;

pub use user::*;
