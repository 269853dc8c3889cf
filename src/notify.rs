//! Owner notification for new contact-form submissions.
//!
//! Notifications are best effort: they run on a background task after the
//! submission is stored and never affect the response to the visitor.

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use thiserror::Error;

use crate::models::ContactSubmission;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifications disabled")]
    Disabled,

    #[error("no notification recipient configured")]
    NoRecipient,

    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Mail relay account. The username doubles as the sender address.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    password: String,
}

impl SmtpSettings {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyProvider {
    /// Mails the owner through a STARTTLS relay.
    Smtp(SmtpSettings),
    /// Writes the rendered message to the log.
    Console,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    pub provider: NotifyProvider,
    pub recipient: Option<String>,
}

impl NotifyConfig {
    pub fn disabled() -> Self {
        Self {
            provider: NotifyProvider::Disabled,
            recipient: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body_text: String,
}

impl Notification {
    pub fn for_contact(to: &str, contact: &ContactSubmission) -> Self {
        let phone = contact.phone.as_deref().unwrap_or("Not provided");
        let project_type = contact.project_type.as_deref().unwrap_or("Not specified");
        Self {
            to: to.to_string(),
            subject: format!("New Contact: {} - DevForge", contact.name),
            body_text: format!(
                "New Contact Form Submission\n\
                 ===========================\n\n\
                 Name: {}\n\
                 Email: {}\n\
                 Phone: {}\n\
                 Project type: {}\n\n\
                 Message:\n{}\n\n\
                 ---\n\
                 Submitted at: {}\n",
                contact.name,
                contact.email,
                phone,
                project_type,
                contact.message,
                contact.submitted_at.format("%Y-%m-%d %H:%M:%S UTC"),
            ),
        }
    }
}

enum Transport {
    Smtp {
        mailer: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
    Console,
    Disabled,
}

impl Transport {
    fn build(provider: &NotifyProvider) -> Result<Self, NotifyError> {
        match provider {
            NotifyProvider::Disabled => Ok(Transport::Disabled),
            NotifyProvider::Console => Ok(Transport::Console),
            NotifyProvider::Smtp(smtp) => {
                let from: Mailbox = smtp.username.parse()?;
                let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
                    .port(smtp.port)
                    .credentials(Credentials::new(
                        smtp.username.clone(),
                        smtp.password.clone(),
                    ))
                    .build();
                Ok(Transport::Smtp { mailer, from })
            }
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    transport: Arc<Transport>,
    recipient: Option<Arc<str>>,
}

impl Notifier {
    /// An SMTP setup that cannot be built degrades to console output.
    pub fn new(config: NotifyConfig) -> Self {
        let transport = Transport::build(&config.provider).unwrap_or_else(|e| {
            tracing::error!(error = %e, "SMTP notifier unavailable, logging notifications instead");
            Transport::Console
        });
        Self {
            transport: Arc::new(transport),
            recipient: config.recipient.map(Arc::from),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self.transport.as_ref() {
            Transport::Smtp { .. } => "smtp",
            Transport::Console => "console",
            Transport::Disabled => "disabled",
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.transport.as_ref(), Transport::Disabled)
    }

    pub async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        match self.transport.as_ref() {
            Transport::Disabled => Err(NotifyError::Disabled),
            Transport::Console => {
                tracing::info!(
                    to = %notification.to,
                    subject = %notification.subject,
                    body = %notification.body_text,
                    "email not configured, contact notification logged"
                );
                Ok(())
            }
            Transport::Smtp { mailer, from } => {
                if notification.to.is_empty() {
                    return Err(NotifyError::NoRecipient);
                }
                let message = Message::builder()
                    .from(from.clone())
                    .to(notification.to.parse()?)
                    .subject(notification.subject.clone())
                    .header(ContentType::TEXT_PLAIN)
                    .body(notification.body_text.clone())?;
                mailer.send(message).await?;
                tracing::info!(to = %notification.to, "contact notification emailed");
                Ok(())
            }
        }
    }

    /// Queues a notification for a stored submission and returns immediately.
    pub fn contact_received(&self, contact: ContactSubmission) {
        if !self.is_enabled() {
            tracing::debug!(contact_id = %contact.id, "notifications disabled, skipping");
            return;
        }

        let notifier = self.clone();
        tokio::spawn(async move {
            let to = notifier.recipient.as_deref().unwrap_or_default();
            let notification = Notification::for_contact(to, &contact);
            if let Err(e) = notifier.send(&notification).await {
                tracing::warn!(
                    contact_id = %contact.id,
                    error = %e,
                    "contact notification not sent"
                );
            }
        });
    }
}
