use anyhow::{bail, Context, Result};
use updater_core::{Config, ConfigFile};
use updater_notify::Notifier;

/// Execute `repo-updater notify-test`
pub fn test(config_file: &ConfigFile) -> Result<()> {
    let path = config_file.path();
    let config = Config::load(path).with_context(|| format!("loading {}", path.display()))?;
    let notifier = Notifier::from_config(&config);

    let results = notifier.test_channels();
    if results.is_empty() {
        println!("No notification channels configured.");
        return Ok(());
    }

    for (name, result) in &results {
        println!("{}", result_line(name, result));
    }
    let failed = results.iter().filter(|(_, result)| result.is_err()).count();
    if failed > 0 {
        bail!("{failed} of {} channels failed", results.len());
    }
    Ok(())
}

fn result_line(name: &str, result: &Result<(), String>) -> String {
    match result {
        Ok(()) => format!("  OK  {name}"),
        Err(e) => format!("  ERR {name}: {e}"),
    }
}
