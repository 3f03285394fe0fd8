use std::time::Duration;

use async_trait::async_trait;
use intake_core::config::NotifyConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::notice::ConfirmationNotice;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification api returned status {0}")]
    Status(u16),
    #[error("notification request failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notice: &ConfirmationNotice) -> Result<(), NotifyError>;
}

/// Courier `POST /send` client.
#[derive(Clone)]
pub struct CourierNotifier {
    http: Client,
    api_key: SecretString,
    base_url: String,
}

impl CourierNotifier {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| NotifyError::Transport(error.to_string()))?;

        Ok(Self { http, api_key, base_url: base_url.into().trim_end_matches('/').to_owned() })
    }

    pub fn from_config(config: &NotifyConfig) -> Result<Self, NotifyError> {
        Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

impl std::fmt::Debug for CourierNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourierNotifier").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

#[async_trait]
impl Notifier for CourierNotifier {
    async fn send(&self, notice: &ConfirmationNotice) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(format!("{}/send", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(notice)
            .send()
            .await
            .map_err(|error| NotifyError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        Ok(())
    }
}
