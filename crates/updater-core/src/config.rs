use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// File name looked up next to the executable when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "config_file.json";

/// Polling period used until a configuration has been loaded once.
pub const DEFAULT_POLLING_PERIOD: Duration = Duration::from_secs(60);

/// Directory (relative to the repository) that receives build artifacts.
pub const DIST_DIR: &str = "dist";

/// Settings for one update iteration.
///
/// Built only by [`Config::load`] / [`Config::from_json`]; every key must be present and
/// unknown keys are rejected, so a partially written file never yields a value.
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    repo_location: PathBuf,
    checkout_branch: String,
    setup_options: String,
    install_options: String,
    receiver_teams_webhook: String,
    smtp_server: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    smtp_port: u16,
    receiver_email_list: Vec<String>,
    sender_email: String,
    user_name: String,
    user_password: String,
    polling_period: u64,
}

impl Config {
    /// Read, parse and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate an in-memory JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.repo_location.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("repo_location is empty".into()));
        }
        let branch = self.checkout_branch.trim();
        if branch.is_empty() {
            return Err(ConfigError::Invalid("checkout_branch is empty".into()));
        }
        // Passed to git as a positional argument.
        if branch.starts_with('-') || branch.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "checkout_branch {:?} is not a valid branch name",
                self.checkout_branch
            )));
        }
        if self.polling_period == 0 {
            return Err(ConfigError::Invalid("polling_period must be at least 1 second".into()));
        }
        if let Some(url) = self.webhook_url() {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::Invalid(format!(
                    "receiver_teams_webhook must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if !self.receiver_email_list.is_empty() {
            if self.smtp_server.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "smtp_server is required when receiver_email_list is set".into(),
                ));
            }
            if self.smtp_port == 0 {
                return Err(ConfigError::Invalid("smtp_port must be in 1..=65535".into()));
            }
            if !self.sender_email.contains('@') {
                return Err(ConfigError::Invalid(format!(
                    "sender_email {:?} is not an address",
                    self.sender_email
                )));
            }
            if let Some(bad) = self.receiver_email_list.iter().find(|r| !r.contains('@')) {
                return Err(ConfigError::Invalid(format!(
                    "receiver_email_list entry {bad:?} is not an address"
                )));
            }
        }
        Ok(())
    }

    pub fn repo_location(&self) -> &Path {
        &self.repo_location
    }

    pub fn branch(&self) -> &str {
        self.checkout_branch.trim()
    }

    /// `<repo>/dist`
    pub fn dist_dir(&self) -> PathBuf {
        self.repo_location.join(DIST_DIR)
    }

    /// Extra build-tool arguments, split on whitespace.
    pub fn setup_options(&self) -> Vec<&str> {
        self.setup_options.split_whitespace().collect()
    }

    /// Extra install-tool arguments, split on whitespace.
    pub fn install_options(&self) -> Vec<&str> {
        self.install_options.split_whitespace().collect()
    }

    /// Chat webhook URL; `None` when the key holds an empty string.
    pub fn webhook_url(&self) -> Option<&str> {
        let url = self.receiver_teams_webhook.trim();
        (!url.is_empty()).then_some(url)
    }

    pub fn smtp_server(&self) -> &str {
        self.smtp_server.trim()
    }

    pub fn smtp_port(&self) -> u16 {
        self.smtp_port
    }

    pub fn recipients(&self) -> &[String] {
        &self.receiver_email_list
    }

    pub fn sender_email(&self) -> &str {
        &self.sender_email
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn user_password(&self) -> &str {
        &self.user_password
    }

    pub fn polling_period(&self) -> Duration {
        Duration::from_secs(self.polling_period)
    }

    /// `'<repo>'::<branch>` as shown in notifications and logs.
    pub fn target_label(&self) -> String {
        format!("'{}'::{}", self.repo_location.display(), self.branch())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("repo_location", &self.repo_location)
            .field("checkout_branch", &self.checkout_branch)
            .field("setup_options", &self.setup_options)
            .field("install_options", &self.install_options)
            .field("receiver_teams_webhook", &self.webhook_url().map(|_| "<set>"))
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("receiver_email_list", &self.receiver_email_list)
            .field("sender_email", &self.sender_email)
            .field("user_name", &self.user_name)
            .field("user_password", &"<redacted>")
            .field("polling_period", &self.polling_period)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortRepr {
    Number(u16),
    Text(String),
}

fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    match PortRepr::deserialize(deserializer)? {
        PortRepr::Number(port) => Ok(port),
        PortRepr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid smtp_port {text:?}"))),
    }
}

/// Location of the configuration file, re-read on every iteration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `config_file.json` in the directory holding the running executable.
    /// Falls back to the current directory when the executable path is unknown.
    pub fn beside_executable() -> Self {
        let dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, logging and swallowing any failure.
    pub fn load(&self) -> Option<Config> {
        match Config::load(&self.path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "FAILED to read config data: {e}");
                None
            }
        }
    }
}
