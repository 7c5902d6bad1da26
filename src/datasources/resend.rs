use crate::config::ResendConfig;
use crate::datasources::NotificationSink;
use crate::error::Result;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;

/// E-mail delivery through the Resend API.
pub struct ResendClient {
    client: reqwest::Client,
    config: ResendConfig,
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

impl ResendClient {
    pub fn new(config: ResendConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }
}

impl NotificationSink for ResendClient {
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        let email = ResendEmail {
            from: &self.config.from,
            to: [to],
            subject,
            text: body,
        };

        let response = match self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&email)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Email error: {}", e);
                return false;
            }
        };

        let status = response.status();
        if accepted(status) {
            return true;
        }

        let text = response.text().await.unwrap_or_default();
        tracing::error!("Email failed: {} - {}", status, text);
        false
    }
}

fn accepted(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::CREATED
}
