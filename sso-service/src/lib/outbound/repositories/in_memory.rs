use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::credentials::errors::StorageError;
use crate::credentials::models::Application;
use crate::credentials::models::ApplicationId;
use crate::credentials::models::EmailAddress;
use crate::credentials::models::User;
use crate::credentials::models::UserId;
use crate::credentials::ports::AppProvider;
use crate::credentials::ports::UserProvider;
use crate::credentials::ports::UserSaver;

#[derive(Default)]
struct Tables {
    next_user_id: i64,
    users: HashMap<UserId, User>,
    /// email -> user id; the uniqueness index
    emails: HashMap<EmailAddress, UserId>,
    applications: HashMap<ApplicationId, Application>,
}

/// Volatile credential store.
///
/// The email check and the insert happen under one write lock, which gives
/// the same single-winner guarantee as a unique constraint.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an application, or replace an existing one with the same id.
    ///
    /// # Errors
    /// * `Database` - Name or secret already belongs to another application
    pub async fn provision_application(&self, application: &Application) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        let others = tables
            .applications
            .values()
            .filter(|a| a.id != application.id);
        for other in others {
            if other.name == application.name {
                return Err(StorageError::Database(format!(
                    "name '{}' is already used by application {}",
                    application.name, other.id
                )));
            }
            if other.secret == application.secret {
                return Err(StorageError::Database(format!(
                    "secret of application {} is already in use",
                    application.id
                )));
            }
        }

        tables
            .applications
            .insert(application.id, application.clone());

        Ok(())
    }

    /// Grant or revoke administrator rights.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this id
    pub async fn set_admin(&self, user_id: UserId, is_admin: bool) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;

        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or(StorageError::UserNotFound(user_id.to_string()))?;
        user.is_admin = is_admin;

        Ok(())
    }

    /// Number of registered users.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl UserSaver for InMemoryCredentialStore {
    async fn save_user(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<UserId, StorageError> {
        let mut tables = self.tables.write().await;

        if tables.emails.contains_key(email) {
            return Err(StorageError::UserExists(email.as_str().to_string()));
        }

        tables.next_user_id += 1;
        let id = UserId(tables.next_user_id);

        tables.emails.insert(email.clone(), id);
        tables.users.insert(
            id,
            User {
                id,
                email: email.clone(),
                password_hash: password_hash.to_string(),
                is_admin: false,
            },
        );

        Ok(id)
    }
}

#[async_trait]
impl UserProvider for InMemoryCredentialStore {
    async fn user(&self, email: &EmailAddress) -> Result<User, StorageError> {
        let tables = self.tables.read().await;

        tables
            .emails
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned()
            .ok_or(StorageError::UserNotFound(email.as_str().to_string()))
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError> {
        self.tables
            .read()
            .await
            .users
            .get(&user_id)
            .map(|user| user.is_admin)
            .ok_or(StorageError::UserNotFound(user_id.to_string()))
    }
}

#[async_trait]
impl AppProvider for InMemoryCredentialStore {
    async fn application(&self, app_id: ApplicationId) -> Result<Application, StorageError> {
        self.tables
            .read()
            .await
            .applications
            .get(&app_id)
            .cloned()
            .ok_or(StorageError::ApplicationNotFound(app_id))
    }
}
