//! User persistence
//!
//! `Repository<T>` covers the id-keyed operations any record type gets;
//! `UserStore` adds the email and role lookups the sign-up and sign-in flows
//! need. Both stores enforce email uniqueness themselves: callers may
//! pre-check with `find_by_email`, but only `create`/`update` decide.

mod memory;
mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::models::{NewUser, Role, User};

pub type StoreResult<T> = Result<T, DatabaseError>;

/// Id-keyed persistence for a record type
#[async_trait]
pub trait Repository<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    type Id: Send + Sync + 'static;

    async fn find_by_id(&self, id: Self::Id) -> StoreResult<Option<T>>;

    async fn list_all(&self) -> StoreResult<Vec<T>>;

    /// Overwrite every field of an existing record. Fails with
    /// `DatabaseError::NotFound` if no record has that id.
    async fn update(&self, record: &T) -> StoreResult<T>;

    /// Physically delete a record; returns the number of rows removed.
    async fn delete_by_id(&self, id: Self::Id) -> StoreResult<u64>;
}

#[async_trait]
pub trait UserStore: Repository<User, Id = i64> {
    /// Exact-match lookup. A missing user is `Ok(None)`, not an error.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Insert a user and assign its id. Fails with
    /// `DatabaseError::UniqueConstraintViolation` if the email is taken.
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    async fn list_by_role(&self, role: Role) -> StoreResult<Vec<User>>;
}
