//! Locate the JSON payload in a backend response

use crate::error::TaskError;
use serde_json::Value;

/// Start positions tried before giving up on a response
const MAX_CANDIDATES: usize = 32;

/// Parse the first well-formed JSON object or array in a backend response
///
/// Markdown code fences are stripped first. If the remaining text is not JSON
/// as a whole, each `{` or `[` is tried in turn as the start of a JSON value
/// and the first one that parses wins. Scalars are not payloads.
///
/// A candidate that runs into the end of the text means the output was
/// truncated; values nested inside it are not accepted.
pub fn parse_payload(response: &str) -> Result<Value, TaskError> {
    let text = strip_code_fence(response);

    if text.is_empty() {
        return Err(TaskError::BackendOutputParse("Empty response".to_string()));
    }

    if let Ok(value @ (Value::Object(_) | Value::Array(_))) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    for (idx, _) in text.match_indices(['{', '[']).take(MAX_CANDIDATES) {
        let mut stream = serde_json::Deserializer::from_str(&text[idx..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) => return Ok(value),
            Some(Err(e)) if e.is_eof() => {
                return Err(TaskError::BackendOutputParse(format!(
                    "Response ends inside a JSON value at byte {} ({} chars)",
                    idx,
                    response.len()
                )))
            }
            _ => {}
        }
    }

    Err(TaskError::BackendOutputParse(format!(
        "No JSON object or array found in response ({} chars)",
        response.len()
    )))
}

/// Strip a surrounding markdown code fence, if any
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (```json) up to the first newline
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
