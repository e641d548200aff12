use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::modules::job::error::JobError;
use crate::modules::job::model::{Callback, StatusEvent};
use crate::modules::job::pipeline::StatusNotifier;

pub const WEBHOOK_SECRET_HEADER: &str = "X-Webhook-Secret";

/// POSTs status events as JSON to the job's callback URL.
///
/// A single attempt per call, bounded by the client timeout. Non-2xx replies
/// are reported as errors so the caller can log them.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(timeout: Duration) -> Result<Self, JobError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("video-worker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JobError::Notify(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn parse_url(raw: &str) -> Result<Url, JobError> {
        let url = Url::parse(raw)
            .map_err(|e| JobError::Notify(format!("invalid webhook url '{}': {}", raw, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(JobError::Notify(format!(
                "webhook url scheme '{}' not allowed; only http/https",
                scheme
            ))),
        }
    }
}

#[async_trait]
impl StatusNotifier for WebhookNotifier {
    async fn notify(&self, callback: &Callback, event: &StatusEvent) -> Result<(), JobError> {
        let url = Self::parse_url(&callback.url)?;

        let mut request = self.client.post(url).json(event);
        if let Some(secret) = &callback.secret {
            request = request.header(WEBHOOK_SECRET_HEADER, secret);
        }

        let response = request
            .send()
            .await
            .map_err(|e| JobError::Notify(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JobError::Notify(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
