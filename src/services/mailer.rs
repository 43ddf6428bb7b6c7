use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Build(String),
}

/// SMTP mailer for notification emails. Delivery is fire-and-forget: callers
/// spawn sends in the background and only log failures.
#[derive(Clone)]
pub struct Mailer {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from_address: String,
    from_name: String,
}

impl Mailer {
    /// Builds a mailer when SMTP settings are present; `None` disables email
    pub fn from_config(config: &Config) -> Option<Self> {
        let smtp_server = config.smtp_server.clone()?;
        let smtp_username = config.smtp_username.clone()?;
        let smtp_password = config.smtp_password.as_ref()?.expose_secret().clone();
        let from_address = config.email_from_address.clone()?;

        Some(Self {
            smtp_server,
            smtp_port: config.smtp_port,
            credentials: Credentials::new(smtp_username, smtp_password),
            from_address,
            from_name: config.email_from_name.clone(),
        })
    }

    // A fresh transport per send avoids holding pooled connections open
    // between infrequent notifications.
    fn build_transport(&self) -> Result<SmtpTransport, MailError> {
        Ok(SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn from_mailbox(&self) -> Result<Mailbox, MailError> {
        format!("{} <{}>", self.from_name, self.from_address)
            .parse()
            .map_err(|e| MailError::Address(format!("invalid from address: {e}")))
    }

    /// Sends one HTML message to each recipient. Blocking; run on a blocking
    /// task from async contexts.
    pub fn send_html(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        let transport = self.build_transport()?;
        let from = self.from_mailbox()?;

        for recipient in recipients {
            let email = Message::builder()
                .from(from.clone())
                .to(recipient
                    .parse()
                    .map_err(|e| MailError::Address(format!("invalid recipient: {e}")))?)
                .subject(subject)
                .header(ContentType::TEXT_HTML)
                .body(html_body.to_string())
                .map_err(|e| MailError::Build(e.to_string()))?;

            transport
                .send(&email)
                .map_err(|e| MailError::Transport(e.to_string()))?;
        }

        Ok(())
    }
}

/// Spawns a send so request handling never waits on SMTP. Errors are logged
/// and dropped; no delivery confirmation is consumed anywhere.
pub fn send_in_background(
    mailer: Option<Mailer>,
    recipients: Vec<String>,
    subject: String,
    html_body: String,
) {
    let Some(mailer) = mailer else {
        tracing::debug!(subject = %subject, "SMTP not configured, skipping notification email");
        return;
    };

    if recipients.is_empty() {
        return;
    }

    tokio::task::spawn_blocking(move || {
        if let Err(e) = mailer.send_html(&recipients, &subject, &html_body) {
            tracing::warn!(error = %e, subject = %subject, "Failed to send notification email");
        }
    });
}

/// RSVP outcome notice sent right after admission
pub fn rsvp_notification_body(event_name: &str, guest_name: &str, status: &str) -> String {
    let (headline, detail) = if status == "confirmed" {
        (
            "You're confirmed!",
            "Your spot is reserved. We look forward to seeing you.",
        )
    } else {
        (
            "You're on the waitlist",
            "The event is currently at capacity. We'll reach out if a spot opens up.",
        )
    };

    format!(
        r#"
<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{headline}</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">{headline}</h2>
        <p>Hi {guest_name},</p>
        <p>Thanks for your RSVP to <strong>{event_name}</strong>. {detail}</p>
        <p style="color: #666; font-size: 14px;">
            If you didn't submit this RSVP, you can safely ignore this email.
        </p>
    </div>
</body>
</html>
        "#
    )
}

/// Winner announcement sent after a draw
pub fn winner_notification_body(raffle_name: &str, artist_name: &str, ticket_number: i32) -> String {
    format!(
        r#"
<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>You won!</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">Congratulations!</h2>
        <p>Your ticket <strong>#{ticket_number}</strong> was drawn as the winner for
        <strong>{artist_name}</strong> in the <strong>{raffle_name}</strong> raffle.</p>
        <p>We'll be in touch with the details shortly.</p>
    </div>
</body>
</html>
        "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsvp_body_mentions_waitlist_when_waitlisted() {
        let body = rsvp_notification_body("Block Party", "Ada", "waitlisted");
        assert!(body.contains("waitlist"));
        assert!(body.contains("Block Party"));
    }

    #[test]
    fn rsvp_body_confirms_when_confirmed() {
        let body = rsvp_notification_body("Block Party", "Ada", "confirmed");
        assert!(body.contains("confirmed"));
        assert!(!body.contains("waitlist"));
    }

    #[test]
    fn winner_body_includes_ticket_number() {
        let body = winner_notification_body("Spring Raffle", "The Shakes", 42);
        assert!(body.contains("#42"));
        assert!(body.contains("The Shakes"));
    }
}
