pub mod client;
pub mod response;

pub use client::PracticumClient;
pub use response::check_response;

use crate::error::RelayError;
use async_trait::async_trait;
use serde_json::Value;

/// Source of homework review statuses.
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetch the raw response body for reviews updated since `from_date`.
    async fn fetch_statuses(&self, from_date: i64) -> Result<Value, RelayError>;
}
