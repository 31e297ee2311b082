//! Approver notifications.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Message sent to the approver once a voucher row has been recorded.
    pub fn voucher_submitted(to: &str, voucher_no: &str, sheet_url: &str, pdf_link: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: format!("Voucher {} Submitted for Approval", voucher_no),
            body: format!(
                "A new voucher has been submitted.\nSheet: {}\nPDF: {}",
                sheet_url, pdf_link
            ),
        }
    }
}

#[async_trait]
pub trait Notifier {
    async fn send(&self, notification: &Notification) -> Result<(), ServiceError>;
}

/// Sends notifications through an authenticated SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, ServiceError> {
        let from: Mailbox = config
            .username
            .parse()
            .map_err(|e| ServiceError::Mail(format!("invalid sender address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| ServiceError::Mail(format!("invalid SMTP host: {}", e)))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), ServiceError> {
        let to: Mailbox = notification
            .to
            .parse()
            .map_err(|e| ServiceError::Mail(format!("invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| ServiceError::Mail(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| ServiceError::Mail(e.to_string()))?;

        Ok(())
    }
}
