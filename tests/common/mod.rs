//! Shared fixtures and a recording stream destination for pipeline tests

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cloudwatch_logs_reingest::error::DestinationError;
use cloudwatch_logs_reingest::models::{
    EventRecord, FirehoseEvent, KinesisRecordMetadata, ReingestRecord, StreamKind,
};
use cloudwatch_logs_reingest::reingest::{DestinationProvider, PutRecordsOutcome, StreamDestination};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};

pub const DELIVERY_STREAM_ARN: &str = "arn:aws:firehose:us-east-1:1234567890:deliverystream/DataLog";
pub const KINESIS_STREAM_ARN: &str = "arn:aws:kinesis:us-east-1:1234567890:stream/DataLogSource";

/// Destination that records every call and answers with a fixed behaviour
#[derive(Default)]
pub struct RecordingDestination {
    pub kind: Option<StreamKind>,
    pub always_fail: bool,
    pub calls: Mutex<Vec<(String, Vec<ReingestRecord>)>>,
}

impl RecordingDestination {
    pub fn calls(&self) -> Vec<(String, Vec<ReingestRecord>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreamDestination for RecordingDestination {
    fn kind(&self) -> StreamKind {
        self.kind.unwrap_or(StreamKind::Firehose)
    }

    async fn put_records(
        &self,
        stream_name: &str,
        records: &[ReingestRecord],
    ) -> Result<PutRecordsOutcome, DestinationError> {
        self.calls
            .lock()
            .unwrap()
            .push((stream_name.to_string(), records.to_vec()));

        if self.always_fail {
            return Ok(PutRecordsOutcome {
                failed_count: records.len(),
                error_codes: vec![Some("ServiceUnavailableException".to_string()); records.len()],
            });
        }

        Ok(PutRecordsOutcome::success(records.len()))
    }
}

/// Hands out the same recording destination for every request
#[derive(Default)]
pub struct RecordingProvider {
    pub destination: Arc<RecordingDestination>,
    pub requests: Mutex<Vec<(StreamKind, String)>>,
}

impl RecordingProvider {
    pub fn failing() -> Self {
        Self {
            destination: Arc::new(RecordingDestination {
                always_fail: true,
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

#[async_trait]
impl DestinationProvider for RecordingProvider {
    async fn destination(&self, kind: StreamKind, region: &str) -> Arc<dyn StreamDestination> {
        self.requests.lock().unwrap().push((kind, region.to_string()));
        self.destination.clone()
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn decode(data: &str) -> Vec<u8> {
    STANDARD.decode(data).unwrap()
}

pub fn data_envelope(messages: &[&str]) -> Value {
    let events: Vec<Value> = messages
        .iter()
        .enumerate()
        .map(|(i, m)| json!({ "id": i.to_string(), "timestamp": 1621224088000_i64, "message": m }))
        .collect();
    json!({
        "messageType": "DATA_MESSAGE",
        "owner": "1234567890",
        "logGroup": "DataLog",
        "logStream": "eni-abcedf1234567890-all",
        "subscriptionFilters": ["Filter-DataLog"],
        "logEvents": events,
    })
}

pub fn control_envelope() -> Value {
    json!({
        "messageType": "CONTROL_MESSAGE",
        "owner": "CloudwatchLogs",
        "logGroup": "",
        "logStream": "",
        "subscriptionFilters": [],
        "logEvents": [{
            "id": "",
            "timestamp": 1621224088000_i64,
            "message": "CWL CONTROL MESSAGE: Checking health of destination Firehose."
        }]
    })
}

/// Record whose data is the gzipped, base64-encoded envelope
pub fn record(id: &str, envelope: &Value) -> EventRecord {
    EventRecord {
        record_id: id.to_string(),
        approximate_arrival_timestamp: 1621224132233,
        data: encode(&gzip(envelope.to_string().as_bytes())),
        kinesis_record_metadata: Some(KinesisRecordMetadata {
            partition_key: Some(format!("pk-{}", id)),
        }),
    }
}

pub fn delivery_event(records: Vec<EventRecord>) -> FirehoseEvent {
    FirehoseEvent {
        invocation_id: "invocation".to_string(),
        delivery_stream_arn: Some(DELIVERY_STREAM_ARN.to_string()),
        source_kinesis_stream_arn: None,
        region: "us-east-1".to_string(),
        records,
    }
}

pub fn kinesis_event(records: Vec<EventRecord>) -> FirehoseEvent {
    FirehoseEvent {
        source_kinesis_stream_arn: Some(KINESIS_STREAM_ARN.to_string()),
        ..delivery_event(records)
    }
}

/// Deterministic text that gzip cannot shrink much
pub fn noisy_text(len: usize, seed: u64) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ALPHABET[((state >> 33) % ALPHABET.len() as u64) as usize] as char
        })
        .collect()
}
