use tonic::Status;

use super::parse_email;
use super::require_password;
use crate::domain::credentials::models::ApplicationId;
use crate::domain::credentials::models::LoginCommand;
use crate::domain::credentials::ports::AuthServicePort;
use crate::proto::LoginRequest;
use crate::proto::LoginResponse;

pub async fn login<S: AuthServicePort>(
    service: &S,
    request: LoginRequest,
) -> Result<LoginResponse, Status> {
    let email = parse_email(request.email)?;
    let password = require_password(request.password)?;
    if request.app_id == 0 {
        return Err(Status::invalid_argument("app_id is required"));
    }

    let token = service
        .login(LoginCommand::new(
            email,
            password,
            ApplicationId(request.app_id),
        ))
        .await?;

    Ok(LoginResponse { token })
}
