//! Transactional email through the Resend HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::domain::member::Member;
use crate::domain::notification::Notification;
use crate::models::config::ServerConfig;

pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const NOTIFICATION_TEMPLATE: &str = "notification.html";
const NOTIFICATION_SOURCE: &str = r#"<!doctype html>
<html>
  <body style="font-family: sans-serif; color: #1f2937;">
    <h2 style="margin-bottom: 4px;">{{ title }}</h2>
    {% if body %}<p>{{ body }}</p>{% endif %}
    {% if link %}<p><a href="{{ link }}">Open in Stormdesk</a></p>{% endif %}
    <p style="font-size: 12px; color: #6b7280;">You receive this email because you are a member of a Stormdesk organization.</p>
  </body>
</html>
"#;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("request to mail provider failed: {0}")]
    Http(String),
    #[error("mail provider responded with {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Fire-and-forget email delivery used by the services.
pub trait Mailer {
    /// Emails a copy of an in-app notification to its recipient.
    fn send_notification(&self, recipient: &Member, notification: &Notification);
}

/// Renders the embedded email templates.
#[derive(Clone)]
pub struct EmailTemplates {
    tera: Tera,
}

impl EmailTemplates {
    pub fn new() -> Result<Self, MailerError> {
        let mut tera = Tera::default();
        tera.add_raw_template(NOTIFICATION_TEMPLATE, NOTIFICATION_SOURCE)?;
        Ok(Self { tera })
    }

    pub fn notification(
        &self,
        title: &str,
        body: Option<&str>,
        link: Option<&str>,
    ) -> Result<String, MailerError> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("body", &body);
        context.insert("link", &link);
        Ok(self.tera.render(NOTIFICATION_TEMPLATE, &context)?)
    }
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError>;
}

#[derive(Clone)]
pub struct ResendTransport {
    client: Client,
    api_key: String,
    from: String,
}

impl ResendTransport {
    pub fn new(api_key: String, from: String) -> Result<Self, MailerError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MailerError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl EmailTransport for ResendTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&ResendRequest {
                from: &self.from,
                to: [&email.to],
                subject: &email.subject,
                html: &email.html,
            })
            .send()
            .await
            .map_err(|e| MailerError::Http(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(MailerError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// Sends queued emails on the actix runtime; disabled without an API key.
#[derive(Clone)]
pub struct ResendMailer {
    transport: Option<ResendTransport>,
    templates: EmailTemplates,
}

impl ResendMailer {
    pub fn from_config(config: &ServerConfig) -> Result<Self, MailerError> {
        let transport = match config
            .resend_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
        {
            Some(key) => Some(ResendTransport::new(
                key.to_string(),
                config.email_from.clone(),
            )?),
            None => {
                log::info!("RESEND API key is not set; outgoing email is disabled");
                None
            }
        };
        Ok(Self {
            transport,
            templates: EmailTemplates::new()?,
        })
    }

    pub fn disabled() -> Result<Self, MailerError> {
        Ok(Self {
            transport: None,
            templates: EmailTemplates::new()?,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Sends `email` in the background.
    pub fn queue(&self, email: OutgoingEmail) {
        let Some(transport) = self.transport.clone() else {
            log::debug!("Skipping email to {}: mailer disabled", email.to);
            return;
        };
        actix_web::rt::spawn(async move {
            if let Err(err) = transport.send(&email).await {
                log::error!("Failed to send email to {}: {err}", email.to);
            }
        });
    }
}

impl Mailer for ResendMailer {
    fn send_notification(&self, recipient: &Member, notification: &Notification) {
        if !self.is_enabled() {
            log::debug!(
                "Skipping notification email to {}: mailer disabled",
                recipient.email
            );
            return;
        }
        let body = (!notification.body.is_empty()).then_some(notification.body.as_str());
        let html = match self.templates.notification(
            notification.title.as_str(),
            body,
            notification.link.as_deref(),
        ) {
            Ok(html) => html,
            Err(err) => {
                log::error!("Failed to render notification email: {err}");
                return;
            }
        };
        self.queue(OutgoingEmail {
            to: recipient.email.as_str().to_string(),
            subject: notification.title.as_str().to_string(),
            html,
        });
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;

    use super::Mailer;
    use crate::domain::member::Member;
    use crate::domain::notification::Notification;

    /// Remembers `(recipient email, notification title)` pairs.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: RefCell<Vec<(String, String)>>,
    }

    impl Mailer for RecordingMailer {
        fn send_notification(&self, recipient: &Member, notification: &Notification) {
            self.sent.borrow_mut().push((
                recipient.email.as_str().to_string(),
                notification.title.as_str().to_string(),
            ));
        }
    }
}
