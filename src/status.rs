use crate::error::RelayError;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl ReviewStatus {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "approved" => Some(ReviewStatus::Approved),
            "reviewing" => Some(ReviewStatus::Reviewing),
            "rejected" => Some(ReviewStatus::Rejected),
            _ => None,
        }
    }

    /// Human-readable verdict sent to the chat.
    pub fn verdict(self) -> &'static str {
        match self {
            ReviewStatus::Approved => "Work reviewed: the reviewer liked everything. Hooray!",
            ReviewStatus::Reviewing => "Work has been taken up for review by the reviewer.",
            ReviewStatus::Rejected => "Work reviewed: the reviewer has comments.",
        }
    }
}

/// Build the notification text for a single homework record.
pub fn parse_status(record: &Map<String, Value>) -> Result<String, RelayError> {
    let Some(name) = record.get("homework_name").and_then(Value::as_str) else {
        tracing::error!("homework record has no homework_name");
        return Err(RelayError::IncompleteRecord);
    };

    let status = match record.get("status") {
        Some(Value::String(code)) => ReviewStatus::from_code(code)
            .ok_or_else(|| RelayError::UnknownStatus(code.clone())),
        Some(other) => Err(RelayError::UnknownStatus(other.to_string())),
        None => Err(RelayError::UnknownStatus(Value::Null.to_string())),
    };
    let status = status.inspect_err(|e| tracing::error!(homework = name, error = %e, "cannot map status"))?;

    tracing::debug!(homework = name, ?status, "homework status parsed");
    Ok(format!(
        "Status of work review \"{}\" changed. {}",
        name,
        status.verdict()
    ))
}
