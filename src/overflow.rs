//! Moves the response's overflow back into the origin stream.
//!
//! Firehose rejects a transformation response larger than ~6 MiB. When the
//! projected size is over the ceiling, `Ok` rows are converted to `Dropped`
//! in input order and their original payloads are queued for reingestion,
//! until the projected size fits again.

use crate::codec;
use crate::error::ServiceError;
use crate::models::{EventRecord, FirehoseEvent, RecordResult, ReingestRecord, ResultRecord, StreamKind};
use std::collections::HashMap;
use tracing::debug;

/// Projected response size above which rows are moved out of the response.
/// Kept below the 6,291,456 byte Lambda limit to leave room for JSON framing.
pub const DEFAULT_SIZE_CEILING: usize = 6_000_000;

/// Most records a single PutRecords/PutRecordBatch call accepts.
pub const MAX_BATCH_RECORDS: usize = 500;

/// Result of splitting the overflow out of a response.
#[derive(Debug, Default)]
pub struct OverflowPlan {
    pub groups: Vec<Vec<ReingestRecord>>,
    /// Projected size of the response once the overflow is removed.
    pub projected_size: usize,
}

impl OverflowPlan {
    pub fn total_records(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Look up original input records by record id.
fn input_by_record_id(event: &FirehoseEvent) -> HashMap<&str, &EventRecord> {
    event
        .records
        .iter()
        .map(|record| (record.record_id.as_str(), record))
        .collect()
}

/// Build the replay record for an input: its decoded original bytes,
/// and its partition key when the origin is a Kinesis stream.
pub fn reingest_record(record: &EventRecord, kind: StreamKind) -> Result<ReingestRecord, ServiceError> {
    let data = codec::decode_base64(&record.data).map_err(|source| ServiceError::InputDecode {
        record_id: record.record_id.clone(),
        source,
    })?;

    let partition_key = if kind.uses_partition_key() {
        let key = record
            .partition_key()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ServiceError::MissingPartitionKey(record.record_id.clone()))?;
        Some(key.to_string())
    } else {
        None
    };

    Ok(ReingestRecord { data, partition_key })
}

/// Convert `Ok` rows to `Dropped`, in order, while the projected size is
/// above `ceiling`, grouping their original payloads into batches of at
/// most `max_batch_records`.
///
/// Scanning stops as soon as the running size fits; later `Ok` rows keep
/// their data even if they are larger than the ones already moved.
pub fn split_overflow(
    event: &FirehoseEvent,
    kind: StreamKind,
    records: &mut [ResultRecord],
    ceiling: usize,
    max_batch_records: usize,
) -> Result<OverflowPlan, ServiceError> {
    let max_batch_records = max_batch_records.clamp(1, MAX_BATCH_RECORDS);
    let mut size: usize = records.iter().map(ResultRecord::projected_size).sum();
    let mut plan = OverflowPlan::default();

    if size <= ceiling {
        plan.projected_size = size;
        return Ok(plan);
    }

    let inputs = input_by_record_id(event);
    let mut current: Vec<ReingestRecord> = Vec::new();
    let scan_len = records.len().min(event.records.len());

    for result in records.iter_mut().take(scan_len) {
        if size <= ceiling {
            break;
        }
        if result.result != RecordResult::Ok {
            continue;
        }

        let input = inputs
            .get(result.record_id.as_str())
            .ok_or_else(|| ServiceError::MissingInput(result.record_id.clone()))?;
        current.push(reingest_record(input, kind)?);

        size = size.saturating_sub(result.projected_size());
        result.data = None;
        result.result = RecordResult::Dropped;

        if current.len() >= max_batch_records {
            plan.groups.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        plan.groups.push(current);
    }

    debug!(
        groups = plan.groups.len(),
        records = plan.total_records(),
        projected_size = size,
        "Split overflow records for reingestion"
    );

    plan.projected_size = size;
    Ok(plan)
}
