use anyhow::{bail, Context, Result};
use updater_core::ConfigFile;
use updater_notify::ConfiguredChannels;
use updater_package::Packager;
use updater_runner::{Iteration, Shutdown, Updater};
use updater_sync::GitSync;

/// Execute `repo-updater run [--once]`
pub fn execute(config_file: ConfigFile, once: bool) -> Result<()> {
    let shutdown = Shutdown::new();
    ctrlc_shutdown(shutdown.clone())?;

    let path = config_file.path().to_path_buf();
    tracing::info!(config = %path.display(), "using configuration file");

    let mut updater = Updater::new(
        Box::new(config_file),
        Box::new(GitSync::new()),
        Box::new(Packager::python()),
        Box::new(ConfiguredChannels),
        shutdown,
    );

    if !once {
        updater.run();
        return Ok(());
    }

    match updater.run_iteration() {
        Iteration::ConfigMissing => bail!("no usable configuration at {}", path.display()),
        Iteration::Failed(e) => Err(anyhow::Error::new(e).context("update failed")),
        Iteration::UpToDate | Iteration::Updated { .. } | Iteration::Interrupted => Ok(()),
    }
}

fn ctrlc_shutdown(shutdown: Shutdown) -> Result<()> {
    ctrlc::set_handler(move || {
        tracing::info!("stop requested with Ctrl+C");
        shutdown.request();
    })
    .context("installing Ctrl+C handler")
}
