use crate::codec;
use crate::error::RecordError;
use crate::models::{
    EventRecord, FirehoseEvent, LogsMessage, MessageType, ResultRecord, StreamKind,
};
use crate::transformers::{LogEventTransformer, MessageTransformer};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of transforming one record's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformed {
    /// Base64 of the newline-terminated output lines.
    Data(String),
    Dropped,
}

pub struct RecordProcessor {
    transformer: Arc<dyn LogEventTransformer>,
}

impl RecordProcessor {
    pub fn new(transformer: Arc<dyn LogEventTransformer>) -> Self {
        Self { transformer }
    }

    /// Decode, gunzip, parse and classify one record's `data` field.
    pub fn transform_data(&self, data: &str) -> Result<Transformed, RecordError> {
        let raw = codec::decode_record_data(data)?;
        self.transform_envelope(&raw)
    }

    /// Classify an already inflated envelope and render its log events.
    pub fn transform_envelope(&self, raw: &[u8]) -> Result<Transformed, RecordError> {
        let message: LogsMessage = serde_json::from_slice(raw)?;

        match &message.message_type {
            // Sent by CloudWatch Logs to check the subscription is reachable.
            // No log data.
            MessageType::Control => Ok(Transformed::Dropped),
            MessageType::Data => {
                let lines: Vec<String> = message
                    .log_events
                    .iter()
                    .map(|event| self.transformer.transform(&message, event))
                    .filter(|line| !line.is_empty())
                    .collect();

                if lines.is_empty() {
                    return Ok(Transformed::Dropped);
                }

                let mut output = lines.join("\n");
                output.push('\n');
                Ok(Transformed::Data(codec::encode_base64(output.as_bytes())))
            }
            MessageType::Other(other) => Err(RecordError::UnknownMessageType(other.clone())),
        }
    }

    /// Build the response row for one input record. Never fails; record
    /// level errors become `ProcessingFailed`.
    pub fn process_record(&self, record: &EventRecord, kind: StreamKind) -> ResultRecord {
        let mut result = match self.transform_data(&record.data) {
            Ok(Transformed::Data(data)) => ResultRecord::ok(&record.record_id, data),
            Ok(Transformed::Dropped) => ResultRecord::dropped(&record.record_id),
            Err(e) => {
                warn!(record_id = %record.record_id, "Failed to transform record: {}", e);
                ResultRecord::failed(&record.record_id)
            }
        };

        if kind.uses_partition_key() {
            result.partition_key = record.partition_key().map(str::to_string);
        }

        result
    }

    /// One response row per input record, in input order.
    pub fn transform_records(&self, event: &FirehoseEvent, kind: StreamKind) -> Vec<ResultRecord> {
        let records: Vec<ResultRecord> = event
            .records
            .iter()
            .map(|record| self.process_record(record, kind))
            .collect();

        debug!(
            records = records.len(),
            ok = records.iter().filter(|r| r.is_ok()).count(),
            "Transformed records"
        );

        records
    }
}

impl Default for RecordProcessor {
    fn default() -> Self {
        Self::new(Arc::new(MessageTransformer))
    }
}

/// Estimated size in bytes of the response body: record id plus data of
/// every `Ok` row. JSON framing is not counted.
pub fn projected_size(records: &[ResultRecord]) -> usize {
    records.iter().map(ResultRecord::projected_size).sum()
}
