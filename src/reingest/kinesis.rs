use super::{PutRecordsOutcome, StreamDestination};
use crate::error::DestinationError;
use crate::models::{ReingestRecord, StreamKind};
use async_trait::async_trait;
use aws_sdk_kinesis::error::DisplayErrorContext;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::types::PutRecordsRequestEntry;
use aws_sdk_kinesis::Client as KinesisClient;
use tracing::debug;

const API: &str = "PutRecords";

/// Replays records into a Kinesis data stream, keeping their partition keys.
pub struct KinesisDestination {
    client: KinesisClient,
}

impl KinesisDestination {
    pub fn new(client: KinesisClient) -> Self {
        Self { client }
    }
}

fn request_entry(record: &ReingestRecord) -> Result<PutRecordsRequestEntry, DestinationError> {
    let partition_key = record
        .partition_key
        .as_deref()
        .ok_or_else(|| DestinationError::InvalidEntry {
            api: API,
            message: "record has no partition key".to_string(),
        })?;

    PutRecordsRequestEntry::builder()
        .data(Blob::new(record.data.clone()))
        .partition_key(partition_key)
        .build()
        .map_err(|e| DestinationError::InvalidEntry {
            api: API,
            message: e.to_string(),
        })
}

#[async_trait]
impl StreamDestination for KinesisDestination {
    fn kind(&self) -> StreamKind {
        StreamKind::Kinesis
    }

    async fn put_records(
        &self,
        stream_name: &str,
        records: &[ReingestRecord],
    ) -> Result<PutRecordsOutcome, DestinationError> {
        let entries = records
            .iter()
            .map(request_entry)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(stream = %stream_name, records = entries.len(), "Calling Kinesis PutRecords");

        let output = self
            .client
            .put_records()
            .stream_name(stream_name)
            .set_records(Some(entries))
            .send()
            .await
            .map_err(|e| DestinationError::Api {
                api: API,
                message: DisplayErrorContext(e).to_string(),
            })?;

        let error_codes: Vec<Option<String>> = output
            .records()
            .iter()
            .map(|entry| entry.error_code().filter(|c| !c.is_empty()).map(str::to_string))
            .collect();

        Ok(PutRecordsOutcome {
            failed_count: output.failed_record_count().unwrap_or(0).max(0) as usize,
            error_codes,
        })
    }
}
