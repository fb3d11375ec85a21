//! Outbound mail adapter.
//!
//! Business code builds a [`MailMessage`]; the [`Mailer`] substitutes
//! configured defaults for `from`/`reply_to` and hands the resolved message
//! to a [`MailProvider`]. Provider failures are rethrown unchanged.

pub mod http;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail validation error: {0}")]
    Validation(String),
    #[error("mail provider error: {0}")]
    Provider(String),
}

/// Either a provider-side template with a JSON context, or raw HTML.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MailContent {
    Template { name: String, context: serde_json::Value },
    Html(String),
}

#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub content: MailContent,
    pub from: Option<String>,
    pub reply_to: Option<String>,
}

/// A message with defaults applied, ready for a provider.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedMail {
    pub to: String,
    pub from: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub content: MailContent,
}

#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn send(&self, mail: &ResolvedMail) -> Result<(), MailError>;
}

pub struct Mailer {
    provider: std::sync::Arc<dyn MailProvider>,
    cfg: configs::MailerConfig,
}

impl Mailer {
    pub fn new(provider: std::sync::Arc<dyn MailProvider>, cfg: configs::MailerConfig) -> Self {
        Self { provider, cfg }
    }

    /// Apply configured defaults and delegate to the provider.
    pub async fn send(&self, msg: MailMessage) -> Result<(), MailError> {
        if !msg.to.contains('@') {
            return Err(MailError::Validation("invalid recipient address".into()));
        }
        let resolved = ResolvedMail {
            to: msg.to,
            from: msg.from.unwrap_or_else(|| self.cfg.from.clone()),
            reply_to: msg.reply_to.or_else(|| self.cfg.reply_to.clone()),
            subject: msg.subject,
            content: msg.content,
        };
        self.provider.send(&resolved).await
    }
}

/// Recording provider for tests.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockMailProvider {
        pub sent: Mutex<Vec<ResolvedMail>>,
        pub fail_with: Mutex<Option<String>>,
    }

    #[async_trait]
    impl MailProvider for MockMailProvider {
        async fn send(&self, mail: &ResolvedMail) -> Result<(), MailError> {
            if let Some(msg) = self.fail_with.lock().unwrap().clone() {
                return Err(MailError::Provider(msg));
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock::MockMailProvider;
    use std::sync::Arc;

    fn mailer(provider: Arc<MockMailProvider>) -> Mailer {
        let cfg = configs::MailerConfig {
            api_url: String::new(),
            api_key: String::new(),
            from: "hello@stagora.app".into(),
            reply_to: Some("support@stagora.app".into()),
        };
        Mailer::new(provider, cfg)
    }

    #[tokio::test]
    async fn defaults_substituted_when_unset() {
        let provider = Arc::new(MockMailProvider::default());
        let mailer = mailer(provider.clone());
        mailer.send(MailMessage {
            to: "student@example.com".into(),
            subject: "Application received".into(),
            content: MailContent::Template {
                name: "application-received".into(),
                context: serde_json::json!({"post": "Backend intern"}),
            },
            from: None,
            reply_to: None,
        }).await.unwrap();

        let sent = provider.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "hello@stagora.app");
        assert_eq!(sent[0].reply_to.as_deref(), Some("support@stagora.app"));
    }

    #[tokio::test]
    async fn explicit_sender_kept() {
        let provider = Arc::new(MockMailProvider::default());
        let mailer = mailer(provider.clone());
        mailer.send(MailMessage {
            to: "a@b.com".into(),
            subject: "s".into(),
            content: MailContent::Html("<p>hi</p>".into()),
            from: Some("careers@corp.example".into()),
            reply_to: None,
        }).await.unwrap();
        assert_eq!(provider.sent.lock().unwrap()[0].from, "careers@corp.example");
    }

    #[tokio::test]
    async fn provider_failure_rethrown() {
        let provider = Arc::new(MockMailProvider::default());
        *provider.fail_with.lock().unwrap() = Some("rate limited".into());
        let mailer = mailer(provider);
        let err = mailer.send(MailMessage {
            to: "a@b.com".into(),
            subject: "s".into(),
            content: MailContent::Html("x".into()),
            from: None,
            reply_to: None,
        }).await.unwrap_err();
        assert!(matches!(err, MailError::Provider(m) if m == "rate limited"));
    }

    #[tokio::test]
    async fn bad_recipient_rejected() {
        let provider = Arc::new(MockMailProvider::default());
        let mailer = mailer(provider);
        let err = mailer.send(MailMessage {
            to: "not-an-address".into(),
            subject: "s".into(),
            content: MailContent::Html("x".into()),
            from: None,
            reply_to: None,
        }).await.unwrap_err();
        assert!(matches!(err, MailError::Validation(_)));
    }
}
