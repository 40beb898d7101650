//! Rebuild and reinstall the package after a successful sync.

pub mod classifier;
pub mod clean;
pub mod tool;

use std::path::{Path, PathBuf};

use updater_core::config::DIST_DIR;
use updater_core::{Config, UpdateError};

pub use classifier::{ExitCodeClassifier, MarkerClassifier, Outcome, OutcomeClassifier};
pub use clean::clean_dist;
pub use tool::{ProcessOutput, ToolCommand};

/// Printed by `setup.py sdist` once the archive is written.
pub const SDIST_MARKER: &str = "Creating tar archive";
/// Printed by `pip install` on success ("Successfully installed ...").
pub const PIP_MARKER: &str = "Successful";

/// The three rebuild stages, run in order by the orchestrator.
pub trait Packaging {
    fn clean(&self, config: &Config) -> Result<(), UpdateError>;
    fn build(&self, config: &Config) -> Result<(), UpdateError>;
    fn install(&self, config: &Config) -> Result<(), UpdateError>;
}

/// [`Packaging`] driven by external build and install tools.
pub struct Packager {
    pub build_tool: ToolCommand,
    pub install_tool: ToolCommand,
}

impl Default for Packager {
    fn default() -> Self {
        Self::python()
    }
}

impl Packager {
    pub fn new(build_tool: ToolCommand, install_tool: ToolCommand) -> Self {
        Self {
            build_tool,
            install_tool,
        }
    }

    /// `python setup.py sdist` followed by `pip install dist/<artifact>`.
    pub fn python() -> Self {
        Self::new(
            ToolCommand::new(
                "python",
                ["setup.py", "sdist"],
                Box::new(MarkerClassifier::new(SDIST_MARKER)),
            ),
            ToolCommand::new(
                "pip",
                ["install"],
                Box::new(MarkerClassifier::new(PIP_MARKER)),
            ),
        )
    }
}

impl Packaging for Packager {
    fn clean(&self, config: &Config) -> Result<(), UpdateError> {
        clean_dist(&config.dist_dir())
    }

    fn build(&self, config: &Config) -> Result<(), UpdateError> {
        let options = config.setup_options();
        match self.build_tool.execute(config.repo_location(), &options) {
            Outcome::Success => {
                tracing::info!("build successful");
                Ok(())
            }
            Outcome::Failure(detail) => Err(UpdateError::Build { detail }),
        }
    }

    fn install(&self, config: &Config) -> Result<(), UpdateError> {
        let artifact = find_artifact(config.repo_location())?;
        let artifact = artifact.to_string_lossy().into_owned();

        let mut extra = vec![artifact.as_str()];
        extra.extend(config.install_options());
        match self.install_tool.execute(config.repo_location(), &extra) {
            Outcome::Success => {
                tracing::info!(artifact = %artifact, "install successful");
                Ok(())
            }
            Outcome::Failure(detail) => Err(UpdateError::Install { detail }),
        }
    }
}

/// The single artifact in `<repo>/dist`, as a path relative to the repository.
fn find_artifact(repo: &Path) -> Result<PathBuf, UpdateError> {
    let dist = repo.join(DIST_DIR);
    let entries = std::fs::read_dir(&dist).map_err(|e| UpdateError::Install {
        detail: format!("cannot list {}: {e}", dist.display()),
    })?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();

    match names.as_slice() {
        [single] => Ok(Path::new(DIST_DIR).join(single)),
        [] => Err(UpdateError::Install {
            detail: format!("no artifact found in {}", dist.display()),
        }),
        many => Err(UpdateError::Install {
            detail: format!(
                "expected exactly one artifact in {}, found {}: {}",
                dist.display(),
                many.len(),
                many.join(", ")
            ),
        }),
    }
}
