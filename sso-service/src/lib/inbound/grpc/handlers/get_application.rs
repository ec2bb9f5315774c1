use tonic::Status;

use crate::domain::credentials::models::ApplicationId;
use crate::domain::credentials::ports::AuthServicePort;
use crate::proto::GetApplicationRequest;
use crate::proto::GetApplicationResponse;

/// The secret never leaves the service; only id and name are returned.
pub async fn get_application<S: AuthServicePort>(
    service: &S,
    request: GetApplicationRequest,
) -> Result<GetApplicationResponse, Status> {
    if request.app_id == 0 {
        return Err(Status::invalid_argument("app_id is required"));
    }

    let application = service
        .get_application(ApplicationId(request.app_id))
        .await?;

    Ok(application.into())
}
