mod cmd_config;
mod cmd_notify;
mod cmd_run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use updater_core::ConfigFile;

#[derive(Parser)]
#[command(
    name = "repo-updater",
    version,
    about = "Keep a local clone rebased on upstream, rebuilt and reinstalled"
)]
struct Cli {
    /// Configuration file (default: config_file.json next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Poll, rebase, rebuild and reinstall until interrupted (default)
    Run {
        /// Run a single iteration and exit
        #[arg(long)]
        once: bool,
    },
    /// Validate the configuration file and print a redacted summary
    CheckConfig,
    /// Send a test message to every configured notification channel
    NotifyTest,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config_file = cli
        .config
        .map(ConfigFile::new)
        .unwrap_or_else(ConfigFile::beside_executable);

    match cli.cmd.unwrap_or(Command::Run { once: false }) {
        Command::Run { once } => cmd_run::execute(config_file, once),
        Command::CheckConfig => cmd_config::check(&config_file),
        Command::NotifyTest => cmd_notify::test(&config_file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["repo-updater"]).unwrap();
        assert!(cli.cmd.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from([
            "repo-updater",
            "run",
            "--once",
            "--config",
            "/etc/ru.json",
        ])
        .unwrap();
        assert_eq!(cli.cmd, Some(Command::Run { once: true }));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ru.json")));
    }

    #[test]
    fn subcommand_names() {
        let cli = Cli::try_parse_from(["repo-updater", "check-config"]).unwrap();
        assert_eq!(cli.cmd, Some(Command::CheckConfig));
        let cli = Cli::try_parse_from(["repo-updater", "notify-test"]).unwrap();
        assert_eq!(cli.cmd, Some(Command::NotifyTest));
    }
}
