use lambda_runtime::Error;
use service_scaler::{ScaleAction, ScalerService, ServiceUpdater};

pub use service_scaler::Response;

/// Brings the Budibase service up by setting its desired count to 1.
pub async fn create_instance<U: ServiceUpdater>(
    service: &ScalerService<U>,
) -> Result<Response, Error> {
    service.scale(ScaleAction::Create).await
}
