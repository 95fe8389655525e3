//! Request DTOs for the bridge HTTP API
//!
//! A tool call body is the argument bag itself: a JSON object, or nothing.

use serde_json::{Map, Value};

use crate::error::{BridgeError, Result};

/// Parses a tool call body into its argument bag.
///
/// An empty (or whitespace-only) body means no arguments; anything other than
/// a JSON object is rejected.
pub fn parse_tool_arguments(body: &[u8]) -> Result<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(_) => Err(BridgeError::Validation(
            "Tool arguments must be a JSON object".to_string(),
        )),
        Err(e) => Err(BridgeError::Validation(format!(
            "Tool arguments are not valid JSON: {}",
            e
        ))),
    }
}
