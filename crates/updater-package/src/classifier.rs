use crate::tool::ProcessOutput;

/// Verdict on a finished tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Human-readable detail, normally the captured stderr.
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Decides whether a build or install run succeeded.
pub trait OutcomeClassifier: Send + Sync {
    fn classify(&self, output: &ProcessOutput) -> Outcome;
}

/// Success requires `marker` in stdout and a successful exit status.
#[derive(Debug, Clone)]
pub struct MarkerClassifier {
    marker: String,
}

impl MarkerClassifier {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl OutcomeClassifier for MarkerClassifier {
    fn classify(&self, output: &ProcessOutput) -> Outcome {
        if output.stdout.contains(&self.marker) && output.exited_ok() {
            return Outcome::Success;
        }
        let reason = if output.stdout.contains(&self.marker) {
            format!("exited with {}", output.exit_label())
        } else {
            format!(
                "marker {:?} not found in output ({})",
                self.marker,
                output.exit_label()
            )
        };
        Outcome::Failure(failure_detail(output, &reason))
    }
}

/// Success is exit status 0, output text is ignored.
#[derive(Debug, Clone, Default)]
pub struct ExitCodeClassifier;

impl OutcomeClassifier for ExitCodeClassifier {
    fn classify(&self, output: &ProcessOutput) -> Outcome {
        if output.exited_ok() {
            Outcome::Success
        } else {
            let reason = format!("exited with {}", output.exit_label());
            Outcome::Failure(failure_detail(output, &reason))
        }
    }
}

/// Captured stderr when there is any, otherwise `reason`.
fn failure_detail(output: &ProcessOutput, reason: &str) -> String {
    let stderr = output.stderr.trim();
    if stderr.is_empty() {
        reason.to_string()
    } else {
        stderr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &str, stderr: &str, exit_code: Option<i32>) -> ProcessOutput {
        ProcessOutput {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    #[test]
    fn marker_present_is_success() {
        let c = MarkerClassifier::new("Creating tar archive");
        let out = output("running sdist\nCreating tar archive\n", "warning: foo", Some(0));
        assert_eq!(c.classify(&out), Outcome::Success);
    }

    #[test]
    fn marker_absent_reports_stderr() {
        let c = MarkerClassifier::new("Creating tar archive");
        let out = output(
            "running sdist\n",
            "error: package directory 'src' does not exist\n",
            Some(0),
        );
        assert_eq!(
            c.classify(&out),
            Outcome::Failure("error: package directory 'src' does not exist".into())
        );
    }

    #[test]
    fn marker_absent_without_stderr_names_marker() {
        let c = MarkerClassifier::new("Successful");
        match c.classify(&output("", "", Some(0))) {
            Outcome::Failure(detail) => assert!(detail.contains("\"Successful\"")),
            Outcome::Success => panic!("expected failure"),
        }
    }

    #[test]
    fn marker_with_failed_exit_is_failure() {
        let c = MarkerClassifier::new("Successful");
        let out = output("Successfully built\n", "", Some(2));
        match c.classify(&out) {
            Outcome::Failure(detail) => assert!(detail.contains("exit code 2")),
            Outcome::Success => panic!("expected failure"),
        }
        assert!(!c.classify(&output("Successful", "", None)).is_success());
    }

    #[test]
    fn exit_code_classifier() {
        let c = ExitCodeClassifier;
        assert!(c.classify(&output("", "", Some(0))).is_success());
        assert_eq!(
            c.classify(&output("", "boom", Some(1))),
            Outcome::Failure("boom".into())
        );
    }
}
