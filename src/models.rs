use crate::error::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ===== Request Models =====

/// One transformation invocation as delivered by Firehose.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseEvent {
    #[serde(default)]
    pub invocation_id: String,
    #[serde(default)]
    pub delivery_stream_arn: Option<String>,
    #[serde(default)]
    pub source_kinesis_stream_arn: Option<String>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub record_id: String,
    #[serde(default)]
    pub approximate_arrival_timestamp: i64,
    /// Base64 text as received; gzip-compressed log envelope underneath.
    pub data: String,
    #[serde(default, alias = "kinesisMetadata")]
    pub kinesis_record_metadata: Option<KinesisRecordMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisRecordMetadata {
    #[serde(default)]
    pub partition_key: Option<String>,
}

impl EventRecord {
    pub fn partition_key(&self) -> Option<&str> {
        self.kinesis_record_metadata
            .as_ref()
            .and_then(|m| m.partition_key.as_deref())
    }
}

// ===== Stream Origin =====

/// Which API a stream is written through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Firehose,
    Kinesis,
}

impl StreamKind {
    /// Whether records replayed into this kind of stream carry a partition key.
    pub fn uses_partition_key(self) -> bool {
        matches!(self, StreamKind::Kinesis)
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Firehose => f.write_str("firehose"),
            StreamKind::Kinesis => f.write_str("kinesis"),
        }
    }
}

/// The stream an invocation's records came from, and where overflow goes back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOrigin {
    DeliveryStream { arn: String },
    KinesisStream { arn: String },
}

impl StreamOrigin {
    pub fn kind(&self) -> StreamKind {
        match self {
            StreamOrigin::DeliveryStream { .. } => StreamKind::Firehose,
            StreamOrigin::KinesisStream { .. } => StreamKind::Kinesis,
        }
    }

    pub fn arn(&self) -> &str {
        match self {
            StreamOrigin::DeliveryStream { arn } | StreamOrigin::KinesisStream { arn } => arn,
        }
    }

    /// Segment after the last `/` of the ARN.
    pub fn stream_name(&self) -> &str {
        let arn = self.arn();
        arn.rsplit('/').next().unwrap_or(arn)
    }
}

impl FirehoseEvent {
    /// A non-empty `sourceKinesisStreamArn` selects the Kinesis origin,
    /// otherwise the delivery stream itself is the origin.
    pub fn origin(&self) -> Result<StreamOrigin, ServiceError> {
        let origin = match non_empty(&self.source_kinesis_stream_arn) {
            Some(arn) => StreamOrigin::KinesisStream {
                arn: arn.to_string(),
            },
            None => match non_empty(&self.delivery_stream_arn) {
                Some(arn) => StreamOrigin::DeliveryStream {
                    arn: arn.to_string(),
                },
                None => {
                    return Err(ServiceError::InvalidEvent(
                        "neither sourceKinesisStreamArn nor deliveryStreamArn is set".to_string(),
                    ))
                }
            },
        };

        if !origin.arn().contains('/') || origin.stream_name().is_empty() {
            return Err(ServiceError::InvalidEvent(format!(
                "cannot derive a stream name from {}",
                origin.arn()
            )));
        }

        Ok(origin)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// ===== Log Envelope =====

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum MessageType {
    Control,
    Data,
    Other(String),
}

impl From<String> for MessageType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CONTROL_MESSAGE" => MessageType::Control,
            "DATA_MESSAGE" => MessageType::Data,
            _ => MessageType::Other(value),
        }
    }
}

/// CloudWatch Logs subscription payload, after base64 decoding and gunzip.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsMessage {
    pub message_type: MessageType,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub log_group: String,
    #[serde(default)]
    pub log_stream: String,
    #[serde(default)]
    pub subscription_filters: Vec<String>,
    #[serde(default)]
    pub log_events: Vec<LogEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub message: String,
}

// ===== Response Models =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordResult {
    Ok,
    Dropped,
    ProcessingFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub record_id: String,
    pub result: RecordResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
}

impl ResultRecord {
    pub fn ok(record_id: impl Into<String>, data: String) -> Self {
        Self {
            record_id: record_id.into(),
            result: RecordResult::Ok,
            data: Some(data),
            partition_key: None,
        }
    }

    pub fn dropped(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            result: RecordResult::Dropped,
            data: None,
            partition_key: None,
        }
    }

    pub fn failed(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            result: RecordResult::ProcessingFailed,
            data: None,
            partition_key: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == RecordResult::Ok
    }

    /// Bytes this row is estimated to add to the response body.
    pub fn projected_size(&self) -> usize {
        match (&self.result, &self.data) {
            (RecordResult::Ok, Some(data)) => self.record_id.len() + data.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirehoseResponse {
    pub records: Vec<ResultRecord>,
}

// ===== Internal Models =====

/// A record prepared for replay into the origin stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReingestRecord {
    /// Original record bytes (base64-decoded, still compressed).
    pub data: Vec<u8>,
    pub partition_key: Option<String>,
}
