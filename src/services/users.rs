use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::user::{User, UserProfile};
use crate::repositories::UserRepository;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub profile: UserProfile,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    event_sender: EventSender,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, event_sender: EventSender) -> Self {
        Self {
            users,
            event_sender,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: NewUser) -> Result<User, ServiceError> {
        input.validate()?;

        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            profile: input.profile,
        };
        let user = self.users.insert(user).await?;

        self.event_sender
            .send(Event::UserCreated(user.id))
            .await
            .map_err(ServiceError::EventError)?;
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, ServiceError> {
        self.users.find_by_id(user_id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        self.users.list().await
    }
}
