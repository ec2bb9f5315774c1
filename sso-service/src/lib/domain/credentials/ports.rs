use async_trait::async_trait;
use chrono::Duration;

use crate::credentials::errors::AuthError;
use crate::credentials::errors::StorageError;
use crate::credentials::errors::TokenError;
use crate::credentials::models::Application;
use crate::credentials::models::ApplicationId;
use crate::credentials::models::EmailAddress;
use crate::credentials::models::LoginCommand;
use crate::credentials::models::RegisterUserCommand;
use crate::credentials::models::TokenClaims;
use crate::credentials::models::User;
use crate::credentials::models::UserId;

/// Port for credential service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// Not idempotent: repeating a successful registration fails with
    /// `AlreadyExists`, it never overwrites the existing user.
    ///
    /// # Returns
    /// Identifier assigned to the new user
    ///
    /// # Errors
    /// * `AlreadyExists` - Email is already registered
    /// * `DeadlineExceeded` - Store did not answer in time
    /// * `Internal` - Hashing or persistence failed
    async fn register_user(&self, command: RegisterUserCommand) -> Result<UserId, AuthError>;

    /// Authenticate a user for an application and issue a signed token.
    ///
    /// # Returns
    /// Token signed with the application's secret
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, wrong password or unknown application
    /// * `Signing` - The application's secret was rejected
    /// * `DeadlineExceeded` - Store did not answer in time
    /// * `Internal` - Persistence failed
    async fn login(&self, command: LoginCommand) -> Result<String, AuthError>;

    /// Report whether a user has administrator rights.
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this id
    async fn is_admin(&self, user_id: UserId) -> Result<bool, AuthError>;

    /// Look up an application. Trusted internal callers only.
    ///
    /// # Errors
    /// * `ApplicationNotFound` - No application with this id
    async fn get_application(&self, app_id: ApplicationId) -> Result<Application, AuthError>;
}

/// Persists new users.
#[async_trait]
pub trait UserSaver: Send + Sync + 'static {
    /// Insert a user atomically.
    ///
    /// Email uniqueness must be enforced by the store itself so that concurrent
    /// registrations of one email produce exactly one success.
    ///
    /// # Errors
    /// * `UserExists` - Email is already registered
    async fn save_user(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<UserId, StorageError>;
}

/// Reads users.
#[async_trait]
pub trait UserProvider: Send + Sync + 'static {
    /// # Errors
    /// * `UserNotFound` - No user with this email
    async fn user(&self, email: &EmailAddress) -> Result<User, StorageError>;

    /// # Errors
    /// * `UserNotFound` - No user with this id
    async fn is_admin(&self, user_id: UserId) -> Result<bool, StorageError>;
}

/// Reads applications.
#[async_trait]
pub trait AppProvider: Send + Sync + 'static {
    /// # Errors
    /// * `ApplicationNotFound` - No application with this id
    async fn application(&self, app_id: ApplicationId) -> Result<Application, StorageError>;
}

/// Signs and verifies tokens, one key per application.
pub trait TokenIssuer: Send + Sync + 'static {
    /// Issue a token for `user` scoped to `application`, valid for `ttl`.
    ///
    /// # Errors
    /// * `Signing` - The application's secret was rejected
    fn issue(
        &self,
        user: &User,
        application: &Application,
        ttl: Duration,
    ) -> Result<String, TokenError>;

    /// Verify a token against the application it claims to be for.
    ///
    /// # Errors
    /// * `Expired` - Expiry has passed
    /// * `InvalidSignature` - Not signed with this application's secret
    /// * `ApplicationMismatch` - Signed for another application id
    /// * `Malformed` - Not a well-formed token
    fn verify(&self, token: &str, application: &Application) -> Result<TokenClaims, TokenError>;
}
