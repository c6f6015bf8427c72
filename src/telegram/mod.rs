pub mod bot;

pub use bot::TelegramBot;

use anyhow::Result;
use async_trait::async_trait;

/// Delivers plain-text messages to the configured recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}
