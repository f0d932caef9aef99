use super::{PutRecordsOutcome, RetryPolicy, StreamDestination};
use crate::error::{DestinationError, ServiceError};
use crate::models::ReingestRecord;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Writes reingest batches to a destination one at a time, retrying the
/// failed part of each batch until it is fully written or the retry
/// budget runs out.
pub struct ReingestWriter<'a> {
    destination: &'a dyn StreamDestination,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl<'a> ReingestWriter<'a> {
    pub fn new(
        destination: &'a dyn StreamDestination,
        policy: RetryPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            destination,
            policy,
            cancel,
        }
    }

    /// Write every batch in order. Returns the number of records written.
    ///
    /// `event_records` is only used for progress reporting.
    pub async fn put_batches(
        &self,
        stream_name: &str,
        batches: &[Vec<ReingestRecord>],
        event_records: usize,
    ) -> Result<usize, ServiceError> {
        let total: usize = batches.iter().map(Vec::len).sum();
        let mut written = 0;

        for batch in batches {
            if let Err(e) = self.put_with_retry(stream_name, batch).await {
                error!(stream = %stream_name, "Failed to reingest records: {}", e);
                return Err(e);
            }

            written += batch.len();
            info!(
                "Reingested {}/{} records out of {} in to {} stream",
                written, total, event_records, stream_name
            );
        }

        info!(
            "Reingested all {} records out of {} in to {} stream",
            total, event_records, stream_name
        );

        Ok(written)
    }

    /// Submit one batch, resubmitting only the entries that failed.
    /// Returns the number of attempts used.
    pub async fn put_with_retry(
        &self,
        stream_name: &str,
        records: &[ReingestRecord],
    ) -> Result<u32, ServiceError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut pending: Vec<ReingestRecord> = records.to_vec();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            if self.cancel.is_cancelled() {
                return Err(ServiceError::Cancelled);
            }

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(ServiceError::Cancelled),
                result = self.destination.put_records(stream_name, &pending) => result,
            };

            let last_error = match result {
                Ok(outcome) if outcome.failed_count == 0 => return Ok(attempt),
                Ok(outcome) => {
                    let (failed, codes) = failed_entries(&pending, &outcome);
                    pending = failed;
                    format!("Individual error codes: {}", codes.join(","))
                }
                // Resubmitting the same entries cannot fix them.
                Err(e @ DestinationError::InvalidEntry { .. }) => return Err(e.into()),
                Err(e) => e.to_string(),
            };

            if !self.policy.should_retry(attempt) {
                return Err(ServiceError::ReingestExhausted {
                    stream: stream_name.to_string(),
                    attempts: attempt,
                    last_error,
                });
            }

            warn!(
                stream = %stream_name,
                attempt,
                pending = pending.len(),
                "Some records failed while putting records, retrying. {}",
                last_error
            );

            let delay = self.policy.delay_for(attempt);
            if !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Err(ServiceError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

/// Entries of `pending` the outcome reports as failed, with their codes.
///
/// A failure count without per-entry codes, or codes that do not line up
/// one-to-one with the submitted entries, gives no way to tell which
/// entries were written, so every entry is resubmitted.
fn failed_entries(
    pending: &[ReingestRecord],
    outcome: &PutRecordsOutcome,
) -> (Vec<ReingestRecord>, Vec<String>) {
    if outcome.error_codes.len() != pending.len() {
        let detail = format!(
            "{} failures with {} error codes for {} entries",
            outcome.failed_count,
            outcome.error_codes.len(),
            pending.len()
        );
        return (pending.to_vec(), vec![detail]);
    }

    let (failed, codes): (Vec<ReingestRecord>, Vec<String>) = pending
        .iter()
        .zip(&outcome.error_codes)
        .filter_map(|(record, code)| code.as_ref().map(|c| (record.clone(), c.clone())))
        .unzip();

    if failed.is_empty() {
        let detail = format!("{} failures without error codes", outcome.failed_count);
        return (pending.to_vec(), vec![detail]);
    }

    (failed, codes)
}
