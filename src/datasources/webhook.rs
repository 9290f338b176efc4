use super::WebhookInvoker;
use crate::error::{Result, RobovacError};

/// Fires vacuum webhooks with a plain GET.
pub struct WebhookClient {
    client: reqwest::Client,
}

impl WebhookClient {
    pub fn new(skip_verify_ssl: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(skip_verify_ssl)
            .build()
            .map_err(|e| RobovacError::Webhook(format!("failed to build client: {}", e)))?;

        Ok(Self { client })
    }
}

impl WebhookInvoker for WebhookClient {
    async fn trigger(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RobovacError::Webhook(format!("GET {}: {}", url, e)))?;

        // Only transport failures count, the status is informational
        tracing::debug!(url, status = %response.status(), "webhook called");
        Ok(())
    }
}
