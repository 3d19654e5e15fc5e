//! Implements IdentityPort from configuration.
//!
//! Authentication belongs to the hosting backend; here the acting user is the
//! configured email, whose profile is created on first use.

use crate::domain::{DomainError, User};
use crate::ports::{IdentityPort, UserDirectory};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

pub struct ConfigIdentity {
    email: String,
    full_name: Option<String>,
    users: Arc<dyn UserDirectory>,
    resolved: OnceCell<User>,
}

impl ConfigIdentity {
    pub fn new(email: String, full_name: Option<String>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            email,
            full_name,
            users,
            resolved: OnceCell::new(),
        }
    }
}

#[async_trait::async_trait]
impl IdentityPort for ConfigIdentity {
    async fn current_user(&self) -> Result<User, DomainError> {
        if self.email.trim().is_empty() {
            return Err(DomainError::Identity("no user email configured".into()));
        }
        let user = self
            .resolved
            .get_or_try_init(|| async {
                let user = self
                    .users
                    .upsert_user(&self.email, self.full_name.as_deref())
                    .await?;
                info!(user_id = %user.id, email = %user.email, "acting as configured user");
                Ok::<_, DomainError>(user)
            })
            .await?;
        Ok(user.clone())
    }
}
