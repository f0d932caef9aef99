use super::LogEventTransformer;
use crate::models::{LogEvent, LogsMessage};

/// Emits the raw log message and nothing else.
pub struct MessageTransformer;

impl LogEventTransformer for MessageTransformer {
    fn transform(&self, _message: &LogsMessage, event: &LogEvent) -> String {
        event.message.clone()
    }
}
