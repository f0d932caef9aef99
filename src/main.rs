use cloudwatch_logs_reingest::models::FirehoseEvent;
use cloudwatch_logs_reingest::service::cancel_at_deadline;
use cloudwatch_logs_reingest::{telemetry, FirehoseResponse, ProcessorConfig, ReingestService};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init_tracing();

    info!("Initializing CloudWatch Logs reingest processor");

    let config = ProcessorConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    // Create service instance
    let service = Arc::new(ReingestService::new(config).await?);

    info!("Service initialized, starting Lambda runtime");

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let service = service.clone();
        async move { handle_request(event, service).await }
    }))
    .await
}

async fn handle_request(
    event: LambdaEvent<Value>,
    service: Arc<ReingestService>,
) -> Result<FirehoseResponse, Error> {
    let deadline = event.context.deadline();

    // Parse invocation
    let invocation: FirehoseEvent = serde_json::from_value(event.payload).map_err(|e| {
        error!("Failed to parse invocation: {}", e);
        e
    })?;

    info!(
        invocation_id = %invocation.invocation_id,
        region = %invocation.region,
        record_count = invocation.records.len(),
        "Processing Firehose transformation request"
    );

    let cancel = CancellationToken::new();
    let timer = cancel_at_deadline(cancel.clone(), deadline, service.config().deadline_margin);

    let result = service.process(invocation, cancel).await;
    timer.abort();

    result.map_err(|e| {
        error!("Failed to process request: {}", e);
        e.into()
    })
}
