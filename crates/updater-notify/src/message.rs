use std::fmt::Write as _;
use std::time::Duration;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use updater_core::{CommitRecord, Config};

pub const SUCCESS_TITLE: &str = "SUCCESSFUL repo-updater notification";
pub const FAILURE_TITLE: &str = "FAILURE in repo-updater";

/// Title and plain-text body, fanned out to every configured channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Summary of a completed update: which commits came in and when the next poll runs.
    pub fn success(
        workstation: &str,
        config: &Config,
        commits: &[CommitRecord],
        now: OffsetDateTime,
    ) -> Self {
        let mut body = String::new();
        let _ = writeln!(body, "repo-updater running on workstation: {workstation}.");
        let _ = writeln!(body, "successfully updated repo:{}", config.target_label());
        let _ = writeln!(body);
        let _ = writeln!(body, "Updated with the following commits:");
        for commit in commits {
            let _ = writeln!(body);
            let _ = write!(body, "{commit}");
        }
        let _ = writeln!(body);
        let _ = write!(body, "{}", next_update_line(config.polling_period(), now));
        Self::new(SUCCESS_TITLE, body)
    }

    /// Report of an aborted iteration; `detail` is the already-masked error text.
    pub fn failure(workstation: &str, target_label: &str, detail: &str) -> Self {
        let body = format!(
            "running on workstation: {workstation}\nfor repo:{target_label}\nwith error:\n{detail}"
        );
        Self::new(FAILURE_TITLE, body)
    }
}

fn next_update_line(period: Duration, now: OffsetDateTime) -> String {
    let minutes = period.as_secs_f64() / 60.0;
    let at = time::Duration::try_from(period)
        .ok()
        .and_then(|d| now.checked_add(d))
        .and_then(|t| t.format(&Rfc3339).ok());
    match at {
        Some(at) => format!("Next update scheduled in {minutes:.2} minutes (at {at})."),
        None => format!("Next update scheduled in {minutes:.2} minutes."),
    }
}

/// Host name used to tell workstations apart in shared channels.
pub fn workstation_id() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown-host".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let doc = serde_json::json!({
            "repo_location": "/work/project",
            "checkout_branch": "main",
            "setup_options": "",
            "install_options": "",
            "receiver_teams_webhook": "",
            "smtp_server": "",
            "smtp_port": 25,
            "receiver_email_list": [],
            "sender_email": "",
            "user_name": "",
            "user_password": "",
            "polling_period": 60
        });
        Config::from_json(&doc.to_string()).unwrap()
    }

    fn commit(position: usize, message: &str) -> CommitRecord {
        CommitRecord {
            id: format!("{position:040}"),
            author: "Ada <ada@example.com>".into(),
            message: message.into(),
            position,
        }
    }

    #[test]
    fn success_lists_commits_in_order() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let commits = [commit(1, "Second change\n"), commit(2, "First change\n")];
        let n = Notification::success("build-box", &config(), &commits, now);

        assert_eq!(n.title, SUCCESS_TITLE);
        assert!(n.body.contains("workstation: build-box."));
        assert!(n.body.contains("repo:'/work/project'::main"));
        let first = n.body.find("Commit #1").unwrap();
        let second = n.body.find("Commit #2").unwrap();
        assert!(first < second);
        assert!(n.body.find("Second change").unwrap() < n.body.find("First change").unwrap());
        assert!(n
            .body
            .ends_with("Next update scheduled in 1.00 minutes (at 2023-11-14T22:14:20Z)."));
    }

    #[test]
    fn failure_carries_detail() {
        let n = Notification::failure("build-box", "'/work/project'::main", "BUILD FAILED:\nboom");
        assert_eq!(n.title, FAILURE_TITLE);
        assert_eq!(
            n.body,
            "running on workstation: build-box\nfor repo:'/work/project'::main\nwith error:\nBUILD FAILED:\nboom"
        );
    }

    #[test]
    fn workstation_id_is_not_empty() {
        assert!(!workstation_id().is_empty());
    }
}
