use crate::config::Credentials;
use crate::error::RelayError;
use crate::practicum::{check_response, HomeworkSource};
use crate::status::parse_status;
use crate::telegram::Notifier;
use std::time::Duration;

/// What a single poll cycle did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// A new status message was produced and handed to the notifier.
    Notified(String),
    /// Same status message as last time; nothing sent.
    Unchanged,
    /// The cycle failed. `reported` is false when the malfunction text
    /// matched the previous one and was suppressed.
    Failed { error: RelayError, reported: bool },
}

/// Polling loop: fetch, validate, format, notify on change, sleep.
pub struct Relay<S, N> {
    source: S,
    notifier: N,
    credentials: Credentials,
    retry_period: Duration,
    cursor: i64,
    last_success_message: String,
    last_error_message: String,
}

impl<S: HomeworkSource, N: Notifier> Relay<S, N> {
    pub fn new(
        source: S,
        notifier: N,
        credentials: Credentials,
        retry_period: Duration,
        cursor: i64,
    ) -> Self {
        Self {
            source,
            notifier,
            credentials,
            retry_period,
            cursor,
            last_success_message: String::new(),
            last_error_message: String::new(),
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Run until credentials turn out to be missing. Never returns `Ok`.
    pub async fn run(&mut self) -> Result<(), RelayError> {
        loop {
            self.check_credentials()?;
            self.poll_once().await;
            tokio::time::sleep(self.retry_period).await;
        }
    }

    pub fn check_credentials(&self) -> Result<(), RelayError> {
        self.credentials.check().inspect_err(|e| {
            tracing::error!(error = %e, "fatal: required credentials are missing, stopping");
        })
    }

    /// One fetch/validate/format/notify pass, without the credential check
    /// or the trailing sleep.
    pub async fn poll_once(&mut self) -> CycleOutcome {
        match self.fetch_message().await {
            Ok(message) => {
                if message == self.last_success_message {
                    tracing::debug!("homework status unchanged");
                    return CycleOutcome::Unchanged;
                }
                self.deliver(&message).await;
                self.last_success_message.clone_from(&message);
                CycleOutcome::Notified(message)
            }
            Err(error) => {
                let reported = self.report_failure(&error).await;
                CycleOutcome::Failed { error, reported }
            }
        }
    }

    async fn fetch_message(&self) -> Result<String, RelayError> {
        let body = self.source.fetch_statuses(self.cursor).await?;
        let record = check_response(&body)?;
        parse_status(record)
    }

    async fn report_failure(&mut self, error: &RelayError) -> bool {
        match error {
            RelayError::Transport(_) | RelayError::UnexpectedStatus(_) | RelayError::Decode(_) => {
                tracing::warn!(error = %error, "homework API call failed");
            }
            RelayError::MalformedResponse(_) | RelayError::UnknownStatus(_) => {
                tracing::warn!(error = %error, "homework API response violates contract");
            }
            RelayError::NoHomeworkData | RelayError::IncompleteRecord => {
                tracing::info!(error = %error, "nothing to report yet");
            }
            RelayError::MissingCredentials(_) => {
                tracing::error!(error = %error, "credentials missing during poll");
            }
        }

        let message = malfunction_message(error);
        if message == self.last_error_message {
            tracing::debug!("malfunction unchanged, notification suppressed");
            return false;
        }
        self.deliver(&message).await;
        self.last_error_message = message;
        true
    }

    /// Send via the notifier. Delivery failures are logged and dropped.
    async fn deliver(&self, message: &str) {
        match self.notifier.send(message).await {
            Ok(()) => tracing::debug!("message sent"),
            Err(e) => tracing::error!(error = %format!("{:#}", e), "failed to send message"),
        }
    }
}

/// Text sent to the chat when a poll cycle fails.
pub fn malfunction_message(error: &impl std::fmt::Display) -> String {
    format!("Program malfunction: {}", error)
}
