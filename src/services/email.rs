//! Email service for reservation reminders

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

/// Outgoing mail capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// SMTP-backed sender
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> AppResult<Message> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Shelfkeeper");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Email(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Email(format!("Invalid to address {}: {}", to, e)))?;

        Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body(body)),
                    ),
            )
            .map_err(|e| AppError::Email(format!("Failed to build email: {}", e)))
    }

    fn build_transport(&self) -> AppResult<SmtpTransport> {
        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Email(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = match (&self.config.smtp_username, &self.config.smtp_password) {
            (Some(username), Some(password)) => {
                mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => mailer_builder,
        };

        Ok(mailer_builder.build())
    }
}

/// HTML alternative of a plain-text body, line breaks kept
fn html_body(text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    format!(
        r#"<html><body><p>{}</p></body></html>"#,
        escaped.replace('\n', "<br>")
    )
}

#[async_trait]
impl EmailSender for EmailService {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let email = self.build_message(to, subject, body)?;
        let mailer = self.build_transport()?;

        // lettre's SmtpTransport blocks
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Email(format!("Failed to send email: {}", e)))?;

        tracing::debug!("Email \"{}\" sent to {}", subject, to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let service = EmailService::new(EmailConfig::default());
        let result = service.build_message("not an address", "Return Reminder", "body");
        assert!(matches!(result, Err(AppError::Email(_))));
    }

    #[test]
    fn test_build_message() {
        let service = EmailService::new(EmailConfig::default());
        let message = service
            .build_message("reader@example.com", "Return Reminder", "line one\nline two")
            .unwrap();
        let headers = message.headers().to_string();
        assert!(headers.contains("Subject: Return Reminder"));
        assert!(headers.contains("reader@example.com"));
    }

    #[test]
    fn test_html_body_escapes_markup() {
        let html = html_body("The book \"<b>Salt & Pepper</b>\" is due.\nThanks");
        assert_eq!(
            html,
            "<html><body><p>The book &quot;&lt;b&gt;Salt &amp; Pepper&lt;/b&gt;&quot; is due.<br>Thanks</p></body></html>"
        );
    }
}
