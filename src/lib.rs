pub mod config;
pub mod error;
pub mod practicum;
pub mod relay;
pub mod status;
pub mod telegram;
