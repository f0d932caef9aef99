use crate::error::ConfigError;
use crate::overflow::{DEFAULT_SIZE_CEILING, MAX_BATCH_RECORDS};
use crate::reingest::RetryPolicy;
use crate::transformers::DEFAULT_TRANSFORMER;
use std::str::FromStr;
use std::time::Duration;

pub const SIZE_CEILING_ENV: &str = "REINGEST_SIZE_CEILING_BYTES";
pub const MAX_BATCH_RECORDS_ENV: &str = "REINGEST_MAX_BATCH_RECORDS";
pub const MAX_ATTEMPTS_ENV: &str = "REINGEST_MAX_ATTEMPTS";
pub const RETRY_BASE_DELAY_ENV: &str = "REINGEST_RETRY_BASE_DELAY_MS";
pub const RETRY_MAX_DELAY_ENV: &str = "REINGEST_RETRY_MAX_DELAY_MS";
pub const DEADLINE_MARGIN_ENV: &str = "REINGEST_DEADLINE_MARGIN_MS";
pub const TRANSFORMER_ENV: &str = "LOG_EVENT_TRANSFORMER";

/// Settings for the transform-and-reingest pipeline, latched at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Projected response size above which records are reingested
    pub size_ceiling: usize,

    /// Records per reingest batch
    pub max_batch_records: usize,

    /// Submissions per batch before the invocation fails
    pub max_attempts: u32,

    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,

    /// How long before the invocation deadline in-flight reingestion is abandoned
    pub deadline_margin: Duration,

    /// Name of the per-line log event transformer
    pub transformer: String,
}

fn default_retry_base_delay_ms() -> u64 {
    50
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_deadline_margin_ms() -> u64 {
    500
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            size_ceiling: DEFAULT_SIZE_CEILING,
            max_batch_records: MAX_BATCH_RECORDS,
            max_attempts: retry.max_attempts,
            retry_base_delay: Duration::from_millis(default_retry_base_delay_ms()),
            retry_max_delay: Duration::from_millis(default_retry_max_delay_ms()),
            deadline_margin: Duration::from_millis(default_deadline_margin_ms()),
            transformer: DEFAULT_TRANSFORMER.to_string(),
        }
    }
}

impl ProcessorConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any name -> value lookup, falling
    /// back to defaults for unset or empty values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            size_ceiling: parse_or(&lookup, SIZE_CEILING_ENV, defaults.size_ceiling)?,
            max_batch_records: parse_or(&lookup, MAX_BATCH_RECORDS_ENV, defaults.max_batch_records)?,
            max_attempts: parse_or(&lookup, MAX_ATTEMPTS_ENV, defaults.max_attempts)?,
            retry_base_delay: Duration::from_millis(parse_or(
                &lookup,
                RETRY_BASE_DELAY_ENV,
                default_retry_base_delay_ms(),
            )?),
            retry_max_delay: Duration::from_millis(parse_or(
                &lookup,
                RETRY_MAX_DELAY_ENV,
                default_retry_max_delay_ms(),
            )?),
            deadline_margin: Duration::from_millis(parse_or(
                &lookup,
                DEADLINE_MARGIN_ENV,
                default_deadline_margin_ms(),
            )?),
            transformer: lookup(TRANSFORMER_ENV)
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.transformer),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_ceiling == 0 {
            return Err(ConfigError::Invalid(format!(
                "{} must be greater than 0",
                SIZE_CEILING_ENV
            )));
        }

        if self.max_batch_records == 0 || self.max_batch_records > MAX_BATCH_RECORDS {
            return Err(ConfigError::Invalid(format!(
                "{} must be between 1 and {}",
                MAX_BATCH_RECORDS_ENV, MAX_BATCH_RECORDS
            )));
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(format!(
                "{} must be at least 1",
                MAX_ATTEMPTS_ENV
            )));
        }

        if self.retry_max_delay < self.retry_base_delay {
            return Err(ConfigError::Invalid(format!(
                "{} must not be lower than {}",
                RETRY_MAX_DELAY_ENV, RETRY_BASE_DELAY_ENV
            )));
        }

        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: self.retry_base_delay,
            max_delay: self.retry_max_delay,
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name, value })
        }
        _ => Ok(default),
    }
}
