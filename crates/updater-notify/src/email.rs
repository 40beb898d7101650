use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use updater_core::Config;

use crate::{Channel, Notification, NotifyError};

const TIMEOUT: Duration = Duration::from_secs(30);

/// Plain-text mail submitted over SMTP with STARTTLS and login credentials.
pub struct EmailChannel {
    server: String,
    port: u16,
    sender: String,
    recipients: Vec<String>,
    user_name: String,
    password: String,
}

impl EmailChannel {
    pub fn from_config(config: &Config) -> Self {
        Self {
            server: config.smtp_server().to_string(),
            port: config.smtp_port(),
            sender: config.sender_email().to_string(),
            recipients: config.recipients().to_vec(),
            user_name: config.user_name().to_string(),
            password: config.user_password().to_string(),
        }
    }

    fn build_message(&self, notification: &Notification) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(mailbox(&self.sender)?)
            .subject(notification.title.as_str())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.recipients {
            builder = builder.to(mailbox(recipient)?);
        }
        Ok(builder.body(notification.body.clone())?)
    }
}

impl Channel for EmailChannel {
    fn name(&self) -> String {
        format!("email({} recipients via {}:{})", self.recipients.len(), self.server, self.port)
    }

    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = self.build_message(notification)?;
        let mailer = SmtpTransport::starttls_relay(&self.server)?
            .port(self.port)
            .credentials(Credentials::new(self.user_name.clone(), self.password.clone()))
            .timeout(Some(TIMEOUT))
            .build();
        let response = mailer.send(&message)?;
        tracing::debug!(code = %response.code(), "smtp accepted message");
        Ok(())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.trim().parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}
