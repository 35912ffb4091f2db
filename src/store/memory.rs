use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{Repository, StoreResult, UserStore};
use crate::error::DatabaseError;
use crate::models::{NewUser, Role, User};

/// Process-local user store. The email check and the insert happen under the
/// same lock, so concurrent sign-ups for one email cannot both succeed.
#[derive(Default)]
pub struct InMemoryUserStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    last_id: i64,
    users: BTreeMap<i64, User>,
}

impl State {
    fn email_taken(&self, email: &str, except_id: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except_id)
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|state| state.users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| DatabaseError::UnexpectedError("user store lock poisoned".to_string()))
    }
}

fn duplicate_email() -> DatabaseError {
    DatabaseError::UniqueConstraintViolation("Email is already registered".to_string())
}

#[async_trait]
impl Repository<User> for InMemoryUserStore {
    type Id = i64;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<User>> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    async fn update(&self, user: &User) -> StoreResult<User> {
        let mut state = self.lock()?;

        if !state.users.contains_key(&user.id) {
            return Err(DatabaseError::NotFound(format!("user {}", user.id)));
        }
        if state.email_taken(&user.email, Some(user.id)) {
            return Err(duplicate_email());
        }

        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        state.users.insert(updated.id, updated.clone());

        Ok(updated)
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<u64> {
        Ok(self.lock()?.users.remove(&id).map_or(0, |_| 1))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.lock()?;

        if state.email_taken(&user.email, None) {
            return Err(duplicate_email());
        }

        state.last_id += 1;
        let now = Utc::now();
        let created = User {
            id: state.last_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone_number: user.phone_number,
            password_hash: user.password_hash,
            birthday: user.birthday,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn list_by_role(&self, role: Role) -> StoreResult<Vec<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }
}
