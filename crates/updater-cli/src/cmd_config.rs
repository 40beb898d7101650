use std::path::Path;

use anyhow::{Context, Result};
use updater_core::{Config, ConfigFile};
use updater_notify::Notifier;

/// Execute `repo-updater check-config`
pub fn check(config_file: &ConfigFile) -> Result<()> {
    let path = config_file.path();
    let config = Config::load(path).with_context(|| format!("checking {}", path.display()))?;
    print!("{}", summary(path, &config));
    Ok(())
}

fn summary(path: &Path, config: &Config) -> String {
    let channels = Notifier::from_config(config).channel_names();
    let channels = if channels.is_empty() {
        "none".to_string()
    } else {
        channels.join(", ")
    };
    let options = |opts: Vec<&str>| {
        if opts.is_empty() {
            "-".to_string()
        } else {
            opts.join(" ")
        }
    };
    format!(
        "Config OK: {}\n  repository:      {}\n  build options:   {}\n  install options: {}\n  polling period:  {}s\n  notifications:   {}\n",
        path.display(),
        config.target_label(),
        options(config.setup_options()),
        options(config.install_options()),
        config.polling_period().as_secs(),
        channels,
    )
}
