use tonic::Status;

use super::parse_email;
use super::require_password;
use crate::domain::credentials::models::RegisterUserCommand;
use crate::domain::credentials::ports::AuthServicePort;
use crate::proto::RegisterRequest;
use crate::proto::RegisterResponse;

pub async fn register<S: AuthServicePort>(
    service: &S,
    request: RegisterRequest,
) -> Result<RegisterResponse, Status> {
    let email = parse_email(request.email)?;
    let password = require_password(request.password)?;

    let user_id = service
        .register_user(RegisterUserCommand::new(email, password))
        .await?;

    Ok(RegisterResponse { user_id: user_id.0 })
}
