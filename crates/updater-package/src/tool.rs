use std::path::{Path, PathBuf};
use std::process::Command;

use crate::classifier::{Outcome, OutcomeClassifier};

/// Captured result of a finished child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn exited_ok(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn exit_label(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {code}"),
            None => "no exit code".to_string(),
        }
    }
}

/// An external program plus its fixed leading arguments and the classifier that
/// judges its output.
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub classifier: Box<dyn OutcomeClassifier>,
}

impl ToolCommand {
    pub fn new<I, S>(
        program: impl Into<PathBuf>,
        args: I,
        classifier: Box<dyn OutcomeClassifier>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            classifier,
        }
    }

    /// Replace the classifier, e.g. with [`crate::ExitCodeClassifier`].
    pub fn with_classifier(mut self, classifier: Box<dyn OutcomeClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// `program args.. extra..` as shown in logs.
    pub fn display(&self, extra: &[&str]) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.extend(extra.iter().map(|s| s.to_string()));
        parts.join(" ")
    }

    /// Run to completion in `cwd` with `extra` appended, blocking until it exits.
    pub fn run(&self, cwd: &Path, extra: &[&str]) -> std::io::Result<ProcessOutput> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .current_dir(cwd)
            .output()?;
        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }

    /// Run and classify. Launch failures are reported as [`Outcome::Failure`].
    pub fn execute(&self, cwd: &Path, extra: &[&str]) -> Outcome {
        let command_line = self.display(extra);
        tracing::debug!(cwd = %cwd.display(), "running {command_line}");
        match self.run(cwd, extra) {
            Ok(output) => {
                tracing::debug!(exit = %output.exit_label(), "{command_line} finished");
                self.classifier.classify(&output)
            }
            Err(e) => Outcome::Failure(format!("failed to launch '{command_line}': {e}")),
        }
    }
}
