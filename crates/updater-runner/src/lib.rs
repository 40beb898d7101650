//! The update loop: load config, sync, rebuild, reinstall, notify, wait.

pub mod shutdown;

use std::time::Duration;

use time::OffsetDateTime;
use updater_core::{
    mask_secrets_with, CommitRecord, Config, ConfigFile, UpdateError, DEFAULT_POLLING_PERIOD,
};
use updater_notify::{workstation_id, Notification, Notify};
use updater_package::Packaging;
use updater_sync::SourceSync;

pub use shutdown::Shutdown;

/// Where each iteration gets its configuration from.
pub trait ConfigSource {
    /// `None` skips the iteration; the previous polling period stays in effect.
    fn load(&self) -> Option<Config>;
}

impl ConfigSource for ConfigFile {
    fn load(&self) -> Option<Config> {
        ConfigFile::load(self)
    }
}

/// How one iteration ended.
#[derive(Debug)]
pub enum Iteration {
    /// Config missing or malformed; nothing was done.
    ConfigMissing,
    /// No upstream commits; nothing rebuilt, nobody notified.
    UpToDate,
    /// Rebuilt and reinstalled; success notification sent.
    Updated { commits: Vec<CommitRecord> },
    /// A stage failed; failure notification sent.
    Failed(UpdateError),
    /// Shutdown was requested before or during a stage; nobody notified.
    Interrupted,
}

/// Owns the collaborators and the polling period carried between iterations.
pub struct Updater {
    config_source: Box<dyn ConfigSource>,
    sync: Box<dyn SourceSync>,
    packaging: Box<dyn Packaging>,
    notify: Box<dyn Notify>,
    shutdown: Shutdown,
    workstation: String,
    polling_period: Duration,
}

impl Updater {
    pub fn new(
        config_source: Box<dyn ConfigSource>,
        sync: Box<dyn SourceSync>,
        packaging: Box<dyn Packaging>,
        notify: Box<dyn Notify>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            config_source,
            sync,
            packaging,
            notify,
            shutdown,
            workstation: workstation_id(),
            polling_period: DEFAULT_POLLING_PERIOD,
        }
    }

    /// Override the workstation name shown in notifications.
    pub fn with_workstation(mut self, workstation: impl Into<String>) -> Self {
        self.workstation = workstation.into();
        self
    }

    /// Interval used by the next wait.
    pub fn polling_period(&self) -> Duration {
        self.polling_period
    }

    /// Run iterations until shutdown is requested.
    pub fn run(&mut self) {
        tracing::info!("started repo-updater; stop with Ctrl+C");
        while !self.shutdown.is_requested() {
            tracing::info!("updating...");
            if let Iteration::Interrupted = self.run_iteration() {
                break;
            }
            let period = self.polling_period;
            tracing::info!(
                "waiting {:.2} minutes until next update",
                period.as_secs_f64() / 60.0
            );
            if self.shutdown.wait(period) {
                break;
            }
        }
        tracing::info!("repo-updater stopped");
    }

    /// One pass through the pipeline. Never panics or returns early on a stage
    /// error; the error is reported and handed back in [`Iteration::Failed`].
    pub fn run_iteration(&mut self) -> Iteration {
        let Some(config) = self.config_source.load() else {
            tracing::warn!(
                "no usable configuration, skipping update; keeping {}s polling period",
                self.polling_period.as_secs()
            );
            return Iteration::ConfigMissing;
        };
        self.polling_period = config.polling_period();
        tracing::info!(
            repo = %config.repo_location().display(),
            branch = config.branch(),
            "target repository"
        );

        match self.update(&config) {
            Ok(None) => {
                tracing::info!("shutdown requested, stopping between stages");
                Iteration::Interrupted
            }
            Ok(Some(commits)) if commits.is_empty() => {
                tracing::info!("repository {} is already up to date", config.target_label());
                Iteration::UpToDate
            }
            Ok(Some(commits)) => {
                tracing::info!(
                    commits = commits.len(),
                    "successfully updated {}",
                    config.target_label()
                );
                if self.shutdown.is_requested() {
                    tracing::info!("shutdown requested, success notification not sent");
                    return Iteration::Interrupted;
                }
                let notification = Notification::success(
                    &self.workstation,
                    &config,
                    &commits,
                    OffsetDateTime::now_utc(),
                );
                self.notify.notify(&config, &notification);
                Iteration::Updated { commits }
            }
            Err(e) if self.shutdown.is_requested() => {
                tracing::info!(stage = e.stage(), "stopped during update: {e}");
                Iteration::Interrupted
            }
            Err(e) => {
                let detail = mask_secrets_with(&e.to_string(), config.user_password());
                tracing::error!(
                    stage = e.stage(),
                    "update of {} failed: {detail}",
                    config.target_label()
                );
                let notification =
                    Notification::failure(&self.workstation, &config.target_label(), &detail);
                self.notify.notify(&config, &notification);
                Iteration::Failed(e)
            }
        }
    }

    /// Sync, then clean/build/install only when new commits arrived.
    /// `None` when shutdown was requested before a stage could start.
    fn update(&self, config: &Config) -> Result<Option<Vec<CommitRecord>>, UpdateError> {
        let commits = self.sync.sync(config)?;
        if commits.is_empty() {
            return Ok(Some(commits));
        }
        if self.stopping("clean") {
            return Ok(None);
        }
        self.packaging.clean(config)?;
        if self.stopping("build") {
            return Ok(None);
        }
        self.packaging.build(config)?;
        if self.stopping("install") {
            return Ok(None);
        }
        self.packaging.install(config)?;
        Ok(Some(commits))
    }

    fn stopping(&self, next_stage: &str) -> bool {
        let requested = self.shutdown.is_requested();
        if requested {
            tracing::debug!(stage = next_stage, "skipping stage after shutdown request");
        }
        requested
    }
}
