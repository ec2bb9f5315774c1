use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::OnceCell;

use crate::credentials::errors::AuthError;
use crate::credentials::errors::CredentialFailure;
use crate::credentials::errors::StorageError;
use crate::credentials::models::Application;
use crate::credentials::models::ApplicationId;
use crate::credentials::models::LoginCommand;
use crate::credentials::models::RegisterUserCommand;
use crate::credentials::models::UserId;
use crate::credentials::ports::AppProvider;
use crate::credentials::ports::AuthServicePort;
use crate::credentials::ports::TokenIssuer;
use crate::credentials::ports::UserProvider;
use crate::credentials::ports::UserSaver;

/// Domain service implementation for credential operations.
///
/// Stateless orchestrator over injected collaborators. Every field is
/// immutable after construction apart from the write-once decoy hash, so one
/// instance can serve any number of concurrent requests.
pub struct AuthService<US, UP, AP, TI>
where
    US: UserSaver,
    UP: UserProvider,
    AP: AppProvider,
    TI: TokenIssuer,
{
    user_saver: Arc<US>,
    user_provider: Arc<UP>,
    app_provider: Arc<AP>,
    token_issuer: Arc<TI>,
    password_hasher: Arc<auth::PasswordHasher>,
    token_ttl: Duration,
    store_timeout: Option<StdDuration>,
    /// Hash checked on the unknown-email path so it costs as much as a wrong password.
    decoy_hash: OnceCell<String>,
}

impl<US, UP, AP, TI> AuthService<US, UP, AP, TI>
where
    US: UserSaver,
    UP: UserProvider,
    AP: AppProvider,
    TI: TokenIssuer,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `user_saver` - Persists new users
    /// * `user_provider` - Looks up users by email and admin flag by id
    /// * `app_provider` - Looks up applications
    /// * `token_issuer` - Signs tokens with per-application secrets
    /// * `token_ttl` - Lifetime of issued tokens
    pub fn new(
        user_saver: Arc<US>,
        user_provider: Arc<UP>,
        app_provider: Arc<AP>,
        token_issuer: Arc<TI>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            user_saver,
            user_provider,
            app_provider,
            token_issuer,
            password_hasher: Arc::new(auth::PasswordHasher::new()),
            token_ttl,
            store_timeout: None,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Use a hasher with a non-default cost for new password hashes.
    pub fn with_password_hasher(mut self, password_hasher: auth::PasswordHasher) -> Self {
        self.password_hasher = Arc::new(password_hasher);
        self.decoy_hash = OnceCell::new();
        self
    }

    /// Fail store calls that take longer than `timeout` with `DeadlineExceeded`.
    pub fn with_store_timeout(mut self, timeout: StdDuration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>> + Send,
    {
        match self.store_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(StorageError::Timeout)),
            None => call.await,
        }
    }

    async fn hash_password(&self, op: &'static str, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.password_hasher);

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::from_join(op, e))?
            .map_err(|e| AuthError::Internal {
                op,
                message: e.to_string(),
            })
    }

    async fn verify_password(
        &self,
        op: &'static str,
        password: String,
        password_hash: String,
    ) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.password_hasher);

        tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
            .await
            .map_err(|e| AuthError::from_join(op, e))?
            .map_err(|e| AuthError::Internal {
                op,
                message: e.to_string(),
            })
    }

    /// Run a full verification whose result is discarded.
    async fn verify_against_decoy(&self, op: &'static str, password: String) {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hash_password(op, "decoy-password".to_string()))
            .await;

        match decoy {
            Ok(hash) => {
                let _ = self.verify_password(op, password, hash.clone()).await;
            }
            Err(e) => tracing::warn!(op = op, error = %e, "Failed to build decoy hash"),
        }
    }
}

#[async_trait]
impl<US, UP, AP, TI> AuthServicePort for AuthService<US, UP, AP, TI>
where
    US: UserSaver,
    UP: UserProvider,
    AP: AppProvider,
    TI: TokenIssuer,
{
    async fn register_user(&self, command: RegisterUserCommand) -> Result<UserId, AuthError> {
        const OP: &str = "auth.register";

        let password_hash = self
            .hash_password(OP, command.password)
            .await
            .inspect_err(|e| tracing::warn!(op = OP, error = %e, "Failed to hash password"))?;

        match self
            .bounded(self.user_saver.save_user(&command.email, &password_hash))
            .await
        {
            Ok(user_id) => {
                tracing::info!(op = OP, user_id = %user_id, "User registered");
                Ok(user_id)
            }
            Err(StorageError::UserExists(_)) => {
                tracing::warn!(op = OP, email = %command.email, "User already exists");
                Err(AuthError::AlreadyExists(command.email.to_string()))
            }
            Err(e) => {
                tracing::error!(op = OP, email = %command.email, error = %e, "Failed to save user");
                Err(AuthError::from_storage(OP, e))
            }
        }
    }

    async fn login(&self, command: LoginCommand) -> Result<String, AuthError> {
        const OP: &str = "auth.login";

        let user = match self.bounded(self.user_provider.user(&command.email)).await {
            Ok(user) => user,
            Err(StorageError::UserNotFound(_)) => {
                tracing::warn!(op = OP, email = %command.email, "User not found");
                self.verify_against_decoy(OP, command.password).await;
                return Err(AuthError::InvalidCredentials(
                    CredentialFailure::UnknownEmail,
                ));
            }
            Err(e) => {
                tracing::error!(op = OP, email = %command.email, error = %e, "Failed to load user");
                return Err(AuthError::from_storage(OP, e));
            }
        };

        let password_matches = self
            .verify_password(OP, command.password, user.password_hash.clone())
            .await
            .inspect_err(|e| tracing::error!(op = OP, user_id = %user.id, error = %e, "Failed to verify password"))?;

        if !password_matches {
            tracing::warn!(op = OP, user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials(
                CredentialFailure::PasswordMismatch,
            ));
        }

        let application = match self
            .bounded(self.app_provider.application(command.app_id))
            .await
        {
            Ok(application) => application,
            Err(StorageError::ApplicationNotFound(_)) => {
                tracing::warn!(op = OP, app_id = %command.app_id, "Application not found");
                return Err(AuthError::InvalidCredentials(
                    CredentialFailure::UnknownApplication,
                ));
            }
            Err(e) => {
                tracing::error!(op = OP, app_id = %command.app_id, error = %e, "Failed to load application");
                return Err(AuthError::from_storage(OP, e));
            }
        };

        let token = self
            .token_issuer
            .issue(&user, &application, self.token_ttl)
            .map_err(|e| {
                tracing::error!(op = OP, app_id = %application.id, error = %e, "Failed to generate token");
                AuthError::Signing {
                    op: OP,
                    message: e.to_string(),
                }
            })?;

        tracing::info!(op = OP, user_id = %user.id, app_id = %application.id, "User logged in");

        Ok(token)
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, AuthError> {
        const OP: &str = "auth.is_admin";

        self.bounded(self.user_provider.is_admin(user_id))
            .await
            .map_err(|e| {
                match &e {
                    StorageError::UserNotFound(_) => {
                        tracing::warn!(op = OP, user_id = %user_id, "User not found")
                    }
                    _ => {
                        tracing::error!(op = OP, user_id = %user_id, error = %e, "Failed to load user")
                    }
                }
                AuthError::from_storage(OP, e)
            })
    }

    async fn get_application(&self, app_id: ApplicationId) -> Result<Application, AuthError> {
        const OP: &str = "auth.get_application";

        self.bounded(self.app_provider.application(app_id))
            .await
            .map_err(|e| {
                match &e {
                    StorageError::ApplicationNotFound(_) => {
                        tracing::warn!(op = OP, app_id = %app_id, "Application not found")
                    }
                    _ => {
                        tracing::error!(op = OP, app_id = %app_id, error = %e, "Failed to load application")
                    }
                }
                AuthError::from_storage(OP, e)
            })
    }
}
