use crate::config::ProcessorConfig;
use crate::error::ServiceError;
use crate::models::{FirehoseEvent, FirehoseResponse};
use crate::overflow;
use crate::processor::RecordProcessor;
use crate::reingest::{AwsDestinations, DestinationProvider, ReingestWriter};
use crate::transformers::TransformerRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct ReingestService {
    config: ProcessorConfig,
    processor: RecordProcessor,
    destinations: Arc<dyn DestinationProvider>,
}

impl ReingestService {
    /// Service backed by the AWS Kinesis and Firehose APIs.
    pub async fn new(config: ProcessorConfig) -> Result<Self, ServiceError> {
        info!("Initializing ReingestService");
        let destinations = Arc::new(AwsDestinations::new().await);
        Self::with_destinations(config, destinations)
    }

    pub fn with_destinations(
        config: ProcessorConfig,
        destinations: Arc<dyn DestinationProvider>,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        let transformer = TransformerRegistry::new().get(&config.transformer)?;

        Ok(Self {
            config,
            processor: RecordProcessor::new(transformer),
            destinations,
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Transform one invocation's records and reingest whatever does not
    /// fit in the response.
    pub async fn process(
        &self,
        event: FirehoseEvent,
        cancel: CancellationToken,
    ) -> Result<FirehoseResponse, ServiceError> {
        let start = Instant::now();

        // 1. Resolve where the records came from
        let origin = event.origin()?;
        let kind = origin.kind();

        // 2. Transform every record
        let mut records = self.processor.transform_records(&event, kind);

        // 3. Move the overflow out of the response
        let plan = overflow::split_overflow(
            &event,
            kind,
            &mut records,
            self.config.size_ceiling,
            self.config.max_batch_records,
        )?;

        // 4. Put the overflow back into the origin stream
        if plan.is_empty() {
            info!("No records needed to be reingested");
        } else {
            let destination = self.destinations.destination(kind, &event.region).await;
            debug!(
                kind = %destination.kind(),
                stream = %origin.stream_name(),
                batches = plan.groups.len(),
                "Reingesting overflow records"
            );

            let writer = ReingestWriter::new(destination.as_ref(), self.config.retry_policy(), cancel);
            writer
                .put_batches(origin.stream_name(), &plan.groups, event.records.len())
                .await?;
        }

        info!(
            invocation_id = %event.invocation_id,
            records = records.len(),
            reingested = plan.total_records(),
            projected_size = plan.projected_size,
            latency_ms = start.elapsed().as_millis() as u64,
            "Processed invocation"
        );

        Ok(FirehoseResponse { records })
    }
}

/// Cancel `token` once `deadline - margin` passes. Abort the returned
/// handle when the invocation finishes first.
pub fn cancel_at_deadline(
    token: CancellationToken,
    deadline: SystemTime,
    margin: Duration,
) -> JoinHandle<()> {
    let remaining = deadline
        .duration_since(SystemTime::now())
        .unwrap_or_default()
        .saturating_sub(margin);

    tokio::spawn(async move {
        tokio::time::sleep(remaining).await;
        token.cancel();
    })
}
