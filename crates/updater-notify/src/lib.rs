pub mod email;
pub mod message;
pub mod teams;

use updater_core::Config;

pub use email::EmailChannel;
pub use message::{workstation_id, Notification, FAILURE_TITLE, SUCCESS_TITLE};
pub use teams::TeamsWebhook;

// ── Errors ──

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("invalid email address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("building email: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

// ── Channels ──

/// One delivery transport.
pub trait Channel {
    /// Display name for logs; never contains credentials.
    fn name(&self) -> String;
    fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// The channels enabled by one configuration snapshot.
#[derive(Default)]
pub struct Notifier {
    channels: Vec<Box<dyn Channel>>,
}

impl Notifier {
    pub fn new(channels: Vec<Box<dyn Channel>>) -> Self {
        Self { channels }
    }

    /// Webhook when a URL is set, email when the recipient list is non-empty.
    pub fn from_config(config: &Config) -> Self {
        let mut channels: Vec<Box<dyn Channel>> = Vec::new();
        match config.webhook_url() {
            Some(url) => channels.push(Box::new(TeamsWebhook::new(url))),
            None => tracing::debug!("webhook notifications not configured"),
        }
        if config.recipients().is_empty() {
            tracing::debug!("email notifications not configured");
        } else {
            channels.push(Box::new(EmailChannel::from_config(config)));
        }
        Self { channels }
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|ch| ch.name()).collect()
    }

    /// Send to every channel. Each channel is attempted regardless of the others;
    /// errors are logged, never propagated.
    pub fn dispatch(&self, notification: &Notification) {
        for channel in &self.channels {
            let name = channel.name();
            match channel.send(notification) {
                Ok(()) => tracing::info!(channel = %name, "notification sent"),
                Err(e) => tracing::warn!(channel = %name, "FAILED to send notification: {e}"),
            }
        }
    }

    /// Send a test notification to all configured channels.
    /// Returns per-channel results for CLI display.
    pub fn test_channels(&self) -> Vec<(String, Result<(), String>)> {
        let test = Notification::new(
            "repo-updater test notification",
            format!(
                "Test message from workstation: {}\nIf you see this, notifications are working.",
                workstation_id()
            ),
        );
        self.channels
            .iter()
            .map(|ch| (ch.name(), ch.send(&test).map_err(|e| e.to_string())))
            .collect()
    }
}

/// Delivery seam used by the orchestrator.
pub trait Notify {
    fn notify(&self, config: &Config, notification: &Notification);
}

/// Builds the channel set from each iteration's configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfiguredChannels;

impl Notify for ConfiguredChannels {
    fn notify(&self, config: &Config, notification: &Notification) {
        Notifier::from_config(config).dispatch(notification);
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FakeChannel {
        name: &'static str,
        fail: bool,
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Channel for FakeChannel {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
            self.calls.borrow_mut().push(self.name);
            if self.fail {
                let err = "not an address".parse::<lettre::message::Mailbox>().unwrap_err();
                return Err(NotifyError::Address {
                    address: "not an address".into(),
                    source: err,
                });
            }
            Ok(())
        }
    }

    fn fake(
        name: &'static str,
        fail: bool,
        calls: &Rc<RefCell<Vec<&'static str>>>,
    ) -> Box<dyn Channel> {
        Box::new(FakeChannel {
            name,
            fail,
            calls: Rc::clone(calls),
        })
    }

    fn config(webhook: &str, recipients: &[&str]) -> Config {
        let doc = serde_json::json!({
            "repo_location": "/work/project",
            "checkout_branch": "main",
            "setup_options": "",
            "install_options": "",
            "receiver_teams_webhook": webhook,
            "smtp_server": "smtp.example.com",
            "smtp_port": 587,
            "receiver_email_list": recipients,
            "sender_email": "updater@example.com",
            "user_name": "updater",
            "user_password": "secret",
            "polling_period": 60
        });
        Config::from_json(&doc.to_string()).unwrap()
    }

    #[test]
    fn failing_webhook_does_not_block_email() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let notifier = Notifier::new(vec![
            fake("webhook", true, &calls),
            fake("email", false, &calls),
        ]);
        notifier.dispatch(&Notification::new("t", "b"));
        assert_eq!(*calls.borrow(), vec!["webhook", "email"]);
    }

    #[test]
    fn failing_email_does_not_block_webhook() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let notifier = Notifier::new(vec![
            fake("email", true, &calls),
            fake("webhook", false, &calls),
        ]);
        notifier.dispatch(&Notification::new("t", "b"));
        assert_eq!(*calls.borrow(), vec!["email", "webhook"]);
    }

    #[test]
    fn test_channels_reports_each_result() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let notifier = Notifier::new(vec![
            fake("webhook", false, &calls),
            fake("email", true, &calls),
        ]);
        let results = notifier.test_channels();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], ("webhook".to_string(), Ok(())));
        assert_eq!(results[1].0, "email");
        assert!(results[1].1.as_ref().unwrap_err().contains("invalid email address"));
    }

    #[test]
    fn only_email_when_webhook_unset() {
        let notifier = Notifier::from_config(&config("", &["ops@example.com"]));
        let names = notifier.channel_names();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("email("));
    }

    #[test]
    fn only_webhook_when_no_recipients() {
        let notifier = Notifier::from_config(&config("https://hooks.example.com/x", &[]));
        assert_eq!(notifier.channel_names(), vec!["webhook(hooks.example.com)"]);
    }

    #[test]
    fn nothing_configured_is_silent() {
        let notifier = Notifier::from_config(&config("", &[]));
        assert!(notifier.channel_names().is_empty());
        notifier.dispatch(&Notification::new("t", "b"));
        assert!(notifier.test_channels().is_empty());
    }
}
