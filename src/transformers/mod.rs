use crate::error::ConfigError;
use crate::models::{LogEvent, LogsMessage};
use std::collections::HashMap;
use std::sync::Arc;

mod json;
mod message;

pub use self::json::JsonLineTransformer;
pub use self::message::MessageTransformer;

/// Name of the transformer used when none is configured.
pub const DEFAULT_TRANSFORMER: &str = "message";

/// Turns one log event of a data envelope into one output line.
///
/// An empty string means the event contributes nothing and is skipped.
pub trait LogEventTransformer: Send + Sync {
    fn transform(&self, message: &LogsMessage, event: &LogEvent) -> String;
}

pub struct TransformerRegistry {
    transformers: HashMap<String, Arc<dyn LogEventTransformer>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        let mut transformers: HashMap<String, Arc<dyn LogEventTransformer>> = HashMap::new();

        // Plain message projection
        transformers.insert(DEFAULT_TRANSFORMER.to_string(), Arc::new(MessageTransformer));

        // One JSON object per line, with the envelope's origin fields
        transformers.insert("json".to_string(), Arc::new(JsonLineTransformer));

        Self { transformers }
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn LogEventTransformer>, ConfigError> {
        self.transformers
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::TransformerNotFound(name.to_string()))
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
