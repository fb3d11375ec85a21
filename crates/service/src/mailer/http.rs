//! HTTP JSON mail provider.
//!
//! Posts resolved messages to a provider endpoint with a bearer key.

use async_trait::async_trait;
use tracing::debug;

use super::{MailError, MailProvider, ResolvedMail};

pub struct HttpMailProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpMailProvider {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self { client: reqwest::Client::new(), api_url, api_key }
    }

    pub fn from_config(cfg: &configs::MailerConfig) -> Self {
        Self::new(cfg.api_url.clone(), cfg.api_key.clone())
    }
}

#[async_trait]
impl MailProvider for HttpMailProvider {
    async fn send(&self, mail: &ResolvedMail) -> Result<(), MailError> {
        if self.api_url.is_empty() {
            return Err(MailError::Provider("mailer.api_url not configured".into()));
        }
        debug!(to = %mail.to, subject = %mail.subject, "mail_dispatch");
        let resp = self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(mail)
            .send()
            .await
            .map_err(|e| MailError::Provider(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(MailError::Provider(format!("provider returned {status}: {body}")));
        }
        Ok(())
    }
}
