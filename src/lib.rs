//! Firehose transformation for CloudWatch Logs subscription records.
//!
//! Each record is decoded, inflated and flattened into newline-delimited
//! log lines. When the response would exceed the Lambda payload limit, the
//! overflow is replayed into the origin stream (Kinesis or Firehose) so a
//! later invocation picks it up.

pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod overflow;
pub mod processor;
pub mod reingest;
pub mod service;
pub mod telemetry;
pub mod transformers;

pub use crate::config::ProcessorConfig;
pub use crate::error::{RecordError, ServiceError};
pub use crate::models::{FirehoseEvent, FirehoseResponse};
pub use crate::service::ReingestService;
