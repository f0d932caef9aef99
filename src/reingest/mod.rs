use crate::error::DestinationError;
use crate::models::{ReingestRecord, StreamKind};
use async_trait::async_trait;
use std::sync::Arc;

mod clients;
mod firehose;
mod kinesis;
mod retry;
mod writer;

pub use self::clients::AwsDestinations;
pub use self::firehose::FirehoseDestination;
pub use self::kinesis::KinesisDestination;
pub use self::retry::RetryPolicy;
pub use self::writer::ReingestWriter;

/// Per-call report of a bulk put.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutRecordsOutcome {
    pub failed_count: usize,
    /// One entry per submitted record, in submission order. `Some` holds
    /// the error code of an entry that was not written.
    pub error_codes: Vec<Option<String>>,
}

impl PutRecordsOutcome {
    pub fn success(count: usize) -> Self {
        Self {
            failed_count: 0,
            error_codes: vec![None; count],
        }
    }
}

/// A stream that accepts bulk writes of replayed records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamDestination: Send + Sync {
    fn kind(&self) -> StreamKind;

    /// Submit one batch. A partial failure is reported in the outcome; an
    /// `Err` means the call itself failed and nothing can be assumed
    /// written.
    async fn put_records(
        &self,
        stream_name: &str,
        records: &[ReingestRecord],
    ) -> Result<PutRecordsOutcome, DestinationError>;
}

/// Resolves the destination client for a stream kind in a region.
#[async_trait]
pub trait DestinationProvider: Send + Sync {
    async fn destination(&self, kind: StreamKind, region: &str) -> Arc<dyn StreamDestination>;
}
