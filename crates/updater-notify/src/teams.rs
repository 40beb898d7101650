use std::time::Duration;

use crate::{Channel, Notification, NotifyError};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Incoming-webhook connector card (Microsoft Teams MessageCard format).
pub struct TeamsWebhook {
    url: String,
}

impl TeamsWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Channel for TeamsWebhook {
    fn name(&self) -> String {
        format!("webhook({})", host_of(&self.url))
    }

    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = format_card(notification);
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .build()
            .new_agent();
        agent
            .post(&self.url)
            .header("Content-Type", "application/json")
            .send(payload.to_string())?;
        Ok(())
    }
}

/// Body lines are escaped and joined with `<br>` inside a `<pre>` block so the
/// card keeps the plain-text layout.
fn format_card(notification: &Notification) -> serde_json::Value {
    let lines: Vec<String> = notification.body.lines().map(escape_html).collect();
    let text = format!("<pre>{}</pre>", lines.join("<br>"));
    serde_json::json!({
        "@type": "MessageCard",
        "@context": "https://schema.org/extensions",
        "summary": notification.title,
        "title": notification.title,
        "text": text,
    })
}

/// Author lines (`Name <email>`) and tool stderr would otherwise render as tags.
fn escape_html(line: &str) -> String {
    line.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Webhook URLs embed a secret path; only the host goes into logs.
fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split(['/', '?']).next().unwrap_or(rest)
}
