use tonic::Status;

use crate::domain::credentials::errors::AuthError;
use crate::domain::credentials::errors::ErrorKind;
use crate::domain::credentials::models::Application;
use crate::domain::credentials::models::EmailAddress;

pub mod get_application;
pub mod is_admin;
pub mod login;
pub mod register;

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        match err.kind() {
            ErrorKind::AlreadyExists => Status::already_exists("user already exists"),
            ErrorKind::InvalidCredentials => Status::unauthenticated("invalid email or password"),
            ErrorKind::NotFound => match err {
                AuthError::ApplicationNotFound(_) => Status::not_found("application not found"),
                _ => Status::not_found("user not found"),
            },
            ErrorKind::Cancelled => Status::cancelled("request cancelled"),
            ErrorKind::DeadlineExceeded => Status::deadline_exceeded("deadline exceeded"),
            ErrorKind::SigningError | ErrorKind::Internal => Status::internal("internal error"),
        }
    }
}

impl From<Application> for crate::proto::GetApplicationResponse {
    fn from(app: Application) -> Self {
        Self {
            id: app.id.0,
            name: app.name,
        }
    }
}

fn parse_email(email: String) -> Result<EmailAddress, Status> {
    EmailAddress::new(email).map_err(|e| Status::invalid_argument(e.to_string()))
}

fn require_password(password: String) -> Result<String, Status> {
    if password.is_empty() {
        return Err(Status::invalid_argument("password is required"));
    }
    Ok(password)
}
