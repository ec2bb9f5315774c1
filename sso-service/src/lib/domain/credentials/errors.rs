use thiserror::Error;
use tokio::task::JoinError;

use crate::credentials::models::ApplicationId;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Failures reported by a credential store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    #[error("Storage operation timed out")]
    Timeout,

    #[error("Database error: {0}")]
    Database(String),
}

/// Failures reported by a token issuer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token was issued for application {actual}, not {expected}")]
    ApplicationMismatch {
        expected: ApplicationId,
        actual: ApplicationId,
    },

    #[error("Malformed token: {0}")]
    Malformed(String),
}

impl From<auth::JwtError> for TokenError {
    fn from(err: auth::JwtError) -> Self {
        match err {
            auth::JwtError::InvalidKey(msg) | auth::JwtError::EncodingFailed(msg) => {
                TokenError::Signing(msg)
            }
            auth::JwtError::TokenExpired => TokenError::Expired,
            auth::JwtError::InvalidSignature => TokenError::InvalidSignature,
            auth::JwtError::DecodingFailed(msg) => TokenError::Malformed(msg),
        }
    }
}

/// Why a login was rejected.
///
/// Kept for logs and diagnostics only; every cause is reported to callers as
/// the same `InvalidCredentials` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    UnknownEmail,
    PasswordMismatch,
    UnknownApplication,
}

/// Externally visible classification of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    InvalidCredentials,
    SigningError,
    Cancelled,
    DeadlineExceeded,
    Internal,
}

/// Top-level error for auth service operations
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    // The cause is deliberately absent from the message.
    #[error("Invalid credentials")]
    InvalidCredentials(CredentialFailure),

    #[error("{op}: token signing failed: {message}")]
    Signing { op: &'static str, message: String },

    #[error("{op}: operation cancelled")]
    Cancelled { op: &'static str },

    #[error("{op}: deadline exceeded")]
    DeadlineExceeded { op: &'static str },

    #[error("{op}: {message}")]
    Internal { op: &'static str, message: String },
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            AuthError::UserNotFound(_) | AuthError::ApplicationNotFound(_) => ErrorKind::NotFound,
            AuthError::InvalidCredentials(_) => ErrorKind::InvalidCredentials,
            AuthError::Signing { .. } => ErrorKind::SigningError,
            AuthError::Cancelled { .. } => ErrorKind::Cancelled,
            AuthError::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            AuthError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Wrap a store failure raised while running `op`, keeping its kind.
    pub fn from_storage(op: &'static str, err: StorageError) -> Self {
        match err {
            StorageError::UserExists(email) => AuthError::AlreadyExists(email),
            StorageError::UserNotFound(key) => AuthError::UserNotFound(key),
            StorageError::ApplicationNotFound(id) => AuthError::ApplicationNotFound(id),
            StorageError::Timeout => AuthError::DeadlineExceeded { op },
            StorageError::Database(message) => AuthError::Internal { op, message },
        }
    }

    /// Wrap the failure of a blocking task spawned by `op`.
    pub fn from_join(op: &'static str, err: JoinError) -> Self {
        if err.is_cancelled() {
            AuthError::Cancelled { op }
        } else {
            AuthError::Internal {
                op,
                message: format!("blocking task panicked: {}", err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_hides_cause() {
        let unknown = AuthError::InvalidCredentials(CredentialFailure::UnknownEmail);
        let mismatch = AuthError::InvalidCredentials(CredentialFailure::PasswordMismatch);

        assert_eq!(unknown.to_string(), mismatch.to_string());
        assert_eq!(unknown.kind(), mismatch.kind());
    }

    #[test]
    fn test_from_storage_preserves_kind() {
        let op = "auth.test";

        assert_eq!(
            AuthError::from_storage(op, StorageError::UserExists("a@b.c".into())).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            AuthError::from_storage(op, StorageError::ApplicationNotFound(ApplicationId(1)))
                .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            AuthError::from_storage(op, StorageError::Timeout).kind(),
            ErrorKind::DeadlineExceeded
        );

        let internal = AuthError::from_storage(op, StorageError::Database("disk I/O".into()));
        assert_eq!(internal.kind(), ErrorKind::Internal);
        assert_eq!(internal.to_string(), "auth.test: disk I/O");
    }

    #[test]
    fn test_jwt_errors_map_to_token_errors() {
        assert_eq!(
            TokenError::from(auth::JwtError::InvalidKey("empty".into())),
            TokenError::Signing("empty".into())
        );
        assert_eq!(
            TokenError::from(auth::JwtError::TokenExpired),
            TokenError::Expired
        );
        assert_eq!(
            TokenError::from(auth::JwtError::InvalidSignature),
            TokenError::InvalidSignature
        );
    }

    #[tokio::test]
    async fn test_from_join_distinguishes_cancellation() {
        let handle = tokio::spawn(std::future::pending::<()>());
        handle.abort();
        let err = handle.await.unwrap_err();

        assert_eq!(
            AuthError::from_join("auth.test", err).kind(),
            ErrorKind::Cancelled
        );
    }
}
