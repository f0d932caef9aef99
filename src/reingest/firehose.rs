use super::{PutRecordsOutcome, StreamDestination};
use crate::error::DestinationError;
use crate::models::{ReingestRecord, StreamKind};
use async_trait::async_trait;
use aws_sdk_firehose::error::DisplayErrorContext;
use aws_sdk_firehose::primitives::Blob;
use aws_sdk_firehose::types::Record;
use aws_sdk_firehose::Client as FirehoseClient;
use tracing::debug;

const API: &str = "PutRecordBatch";

/// Replays records into a Firehose delivery stream.
pub struct FirehoseDestination {
    client: FirehoseClient,
}

impl FirehoseDestination {
    pub fn new(client: FirehoseClient) -> Self {
        Self { client }
    }
}

fn request_record(record: &ReingestRecord) -> Result<Record, DestinationError> {
    Record::builder()
        .data(Blob::new(record.data.clone()))
        .build()
        .map_err(|e| DestinationError::InvalidEntry {
            api: API,
            message: e.to_string(),
        })
}

#[async_trait]
impl StreamDestination for FirehoseDestination {
    fn kind(&self) -> StreamKind {
        StreamKind::Firehose
    }

    async fn put_records(
        &self,
        stream_name: &str,
        records: &[ReingestRecord],
    ) -> Result<PutRecordsOutcome, DestinationError> {
        let batch = records
            .iter()
            .map(request_record)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(stream = %stream_name, records = batch.len(), "Calling Firehose PutRecordBatch");

        let output = self
            .client
            .put_record_batch()
            .delivery_stream_name(stream_name)
            .set_records(Some(batch))
            .send()
            .await
            .map_err(|e| DestinationError::Api {
                api: API,
                message: DisplayErrorContext(e).to_string(),
            })?;

        let error_codes: Vec<Option<String>> = output
            .request_responses()
            .iter()
            .map(|entry| entry.error_code().filter(|c| !c.is_empty()).map(str::to_string))
            .collect();

        Ok(PutRecordsOutcome {
            failed_count: output.failed_put_count().max(0) as usize,
            error_codes,
        })
    }
}
