use create_instance::{create_instance, Response};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use service_scaler::ScalerService;
use tracing::{debug, info};

async fn function_handler(event: LambdaEvent<Value>) -> Result<Response, Error> {
    debug!("Received event: {}", event.payload);

    let service = ScalerService::from_env().await;
    info!(
        "Request {}: creating instance on {}",
        event.context.request_id,
        service.target()
    );

    create_instance(&service).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    run(service_fn(function_handler)).await
}
