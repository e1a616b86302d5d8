use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::user::User;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError>;
    /// All users, sorted by name.
    async fn list(&self) -> Result<Vec<User>, ServiceError>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: DashMap<Uuid, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> Result<User, ServiceError> {
        if self.users.contains_key(&user.id) {
            return Err(ServiceError::InvalidOperation(format!(
                "User {} already exists",
                user.id
            )));
        }
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<User>, ServiceError> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }
}
