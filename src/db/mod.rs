//! Storage layer: the `UserStore` contract with Postgres and in-memory backends.

mod memory;
mod pool;
mod repositories;

pub use memory::MemoryUserStore;
pub use pool::{create_pool, init_schema, DbPool};
pub use repositories::PgUserStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{NewUser, ProfileUpdate, User};

/// User repository keyed by id and email.
///
/// Email uniqueness is enforced by the store itself, atomically, so two
/// concurrent registrations for one address cannot both succeed.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user. Fails with `AppError::DuplicateEmail` when the
    /// email is taken.
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Apply a partial profile change and bump `updated_at`. `None` when the
    /// user no longer exists.
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<Option<User>>;
}
