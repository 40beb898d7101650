//! Bring the local branch up to date with its upstream counterpart.
//!
//! The commits that are about to be integrated are captured *before* the rebase:
//! afterwards `<branch>` and `origin/<branch>` point at the same commit and the
//! range would be empty.

use std::path::{Path, PathBuf};
use std::process::Command;

use updater_core::{CommitRecord, Config, UpdateError};

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';
const LOG_FORMAT: &str = "--format=%H%x1f%an <%ae>%x1f%B%x1e";

/// Integrates upstream commits into the configured branch.
///
/// Implemented by [`GitSync`] and by test doubles in the orchestrator tests.
pub trait SourceSync {
    /// Returns the newly integrated commits; an empty vector means the branch was
    /// already up to date.
    fn sync(&self, config: &Config) -> Result<Vec<CommitRecord>, UpdateError>;
}

/// [`SourceSync`] backed by the `git` command-line client.
pub struct GitSync {
    pub git_bin: PathBuf,
    pub remote: String,
}

impl Default for GitSync {
    fn default() -> Self {
        Self::new()
    }
}

impl GitSync {
    pub fn new() -> Self {
        Self {
            git_bin: PathBuf::from("git"),
            remote: "origin".to_string(),
        }
    }

    pub fn with_bin(git_bin: PathBuf) -> Self {
        Self {
            git_bin,
            ..Self::new()
        }
    }

    /// Run one git command in `repo`, returning stdout.
    fn git(&self, repo: &Path, args: &[&str]) -> Result<String, UpdateError> {
        let step = args.join(" ");
        tracing::debug!(repo = %repo.display(), "git {step}");

        let output = Command::new(&self.git_bin)
            .args(args)
            .current_dir(repo)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| UpdateError::Sync {
                repo: repo.display().to_string(),
                step: step.clone(),
                detail: format!("git not available: {e}"),
            })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        Err(UpdateError::Sync {
            repo: repo.display().to_string(),
            step,
            detail,
        })
    }
}

impl SourceSync for GitSync {
    fn sync(&self, config: &Config) -> Result<Vec<CommitRecord>, UpdateError> {
        let repo = config.repo_location();
        let branch = config.branch();
        let upstream = format!("{}/{}", self.remote, branch);

        self.git(repo, &["checkout", branch])?;
        self.git(repo, &["fetch", &self.remote, branch])?;

        let range = format!("{branch}..{upstream}");
        let log = self.git(repo, &["log", LOG_FORMAT, &range])?;
        let behind = parse_log(&log);
        if behind.is_empty() {
            tracing::info!(branch, "already up to date with {upstream}");
            return Ok(behind);
        }

        tracing::info!(branch, commits = behind.len(), "rebasing onto {upstream}");
        self.git(repo, &["rebase", &upstream])?;
        tracing::info!(branch, "git rebase successful");

        Ok(behind)
    }
}

/// Parse `git log` output produced with [`LOG_FORMAT`].
fn parse_log(log: &str) -> Vec<CommitRecord> {
    log.split(RECORD_SEP)
        .map(|record| record.trim_start_matches(['\n', '\r']))
        .filter(|record| !record.trim().is_empty())
        .filter_map(|record| {
            let mut fields = record.splitn(3, FIELD_SEP);
            let id = fields.next()?.trim().to_string();
            let author = fields.next()?.trim().to_string();
            let message = fields.next().unwrap_or_default().to_string();
            Some((id, author, message))
        })
        .enumerate()
        .map(|(idx, (id, author, message))| CommitRecord {
            id,
            author,
            message,
            position: idx + 1,
        })
        .collect()
}
