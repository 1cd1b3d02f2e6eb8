//! Webhook payload extraction.
//!
//! Senders post either JSON (`{"logs": [...]}`, `{"content": "..."}`, or a
//! bare JSON string) or raw text. Anything that is not JSON is read as UTF-8
//! text, lossily.

use serde_json::Value;

use crate::response::ApiError;

/// Pull the log text out of a webhook body.
pub fn extract_content(content_type: Option<&str>, body: &[u8]) -> Result<String, ApiError> {
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));

    let content = if is_json {
        let value: Value = serde_json::from_slice(body)
            .map_err(|err| ApiError::bad_request(format!("Invalid JSON payload: {err}")))?;
        from_json(value)?
    } else {
        String::from_utf8_lossy(body).into_owned()
    };

    if content.trim().is_empty() {
        return Err(ApiError::bad_request("No log content provided"));
    }
    Ok(content)
}

fn from_json(value: Value) -> Result<String, ApiError> {
    match value {
        Value::Object(mut obj) => {
            if let Some(Value::Array(lines)) = obj.remove("logs") {
                return Ok(lines
                    .into_iter()
                    .map(|line| match line {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("\n"));
            }
            match obj.remove("content") {
                Some(Value::String(content)) => Ok(content),
                _ => Err(ApiError::bad_request("Invalid JSON payload format")),
            }
        }
        Value::String(content) => Ok(content),
        _ => Err(ApiError::bad_request("Invalid JSON payload format")),
    }
}
