use super::LogEventTransformer;
use crate::models::{LogEvent, LogsMessage};
use serde_json::json;
use tracing::warn;

/// Emits each event as a single-line JSON object tagged with the log
/// group and stream it came from.
pub struct JsonLineTransformer;

impl LogEventTransformer for JsonLineTransformer {
    fn transform(&self, message: &LogsMessage, event: &LogEvent) -> String {
        if event.message.is_empty() {
            return String::new();
        }

        let line = json!({
            "id": event.id,
            "timestamp": event.timestamp,
            "message": event.message,
            "logGroup": message.log_group,
            "logStream": message.log_stream,
            "owner": message.owner,
        });

        serde_json::to_string(&line).unwrap_or_else(|e| {
            warn!(event_id = %event.id, "Failed to serialize log event: {}", e);
            String::new()
        })
    }
}
