use thiserror::Error;

/// Failure to turn one input record into an output row.
///
/// These never abort an invocation: the processor folds them into a
/// `ProcessingFailed` status for the record that produced them.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Record data is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Record data is not a valid gzip stream: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("Record data is not a valid log envelope: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown log envelope type: {0}")]
    UnknownMessageType(String),
}

/// Failure reported by a destination stream client for a whole call.
#[derive(Error, Debug)]
pub enum DestinationError {
    #[error("{api} call failed: {message}")]
    Api { api: &'static str, message: String },

    #[error("Could not build {api} entry: {message}")]
    InvalidEntry { api: &'static str, message: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Log event transformer not found: {0}")]
    TransformerNotFound(String),
}

/// Invocation-level failure. Any of these fails the whole batch; no
/// partial response is returned.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("No input record found for record id {0}")]
    MissingInput(String),

    #[error("Input record {0} has no partition key to reingest into a Kinesis stream")]
    MissingPartitionKey(String),

    #[error("Could not decode input data of record {record_id}: {source}")]
    InputDecode {
        record_id: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Could not put records to {stream} after {attempts} attempts. {last_error}")]
    ReingestExhausted {
        stream: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Invocation cancelled before reingestion completed")]
    Cancelled,

    #[error("Destination error: {0}")]
    Destination(#[from] DestinationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
