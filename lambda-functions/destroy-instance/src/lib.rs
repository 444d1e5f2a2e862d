use lambda_runtime::Error;
use service_scaler::{ScaleAction, ScalerService, ServiceUpdater};

pub use service_scaler::Response;

/// Brings the Budibase service down by setting its desired count to 0.
///
/// Returns once ECS acknowledges the update; running tasks drain afterwards.
pub async fn destroy_instance<U: ServiceUpdater>(
    service: &ScalerService<U>,
) -> Result<Response, Error> {
    service.scale(ScaleAction::Destroy).await
}
