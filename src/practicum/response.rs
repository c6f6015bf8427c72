use crate::error::RelayError;
use serde_json::{Map, Value};

/// Check the shape of a `homework_statuses` response and return the newest
/// homework record. The API lists records newest-first.
pub fn check_response(body: &Value) -> Result<&Map<String, Value>, RelayError> {
    let Some(obj) = body.as_object() else {
        return Err(malformed("response body is not a JSON object"));
    };

    let Some(homeworks) = obj.get("homeworks").and_then(Value::as_array) else {
        return Err(malformed("`homeworks` is missing or not an array"));
    };

    let Some(first) = homeworks.first() else {
        tracing::error!("homework list is empty");
        return Err(RelayError::NoHomeworkData);
    };

    let Some(record) = first.as_object() else {
        return Err(malformed("homework record is not a JSON object"));
    };

    tracing::info!(count = homeworks.len(), "homework list checked");
    Ok(record)
}

fn malformed(reason: &'static str) -> RelayError {
    tracing::error!(reason, "malformed homework API response");
    RelayError::MalformedResponse(reason)
}
