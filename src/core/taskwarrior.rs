//! Boundary to the external TaskWarrior binary. One process invocation per
//! call, argv-style (no shell), bounded by a timeout. The adapter performs no
//! semantic validation of due text: it forwards it verbatim and reports
//! exactly what the tool said. No retry logic lives here.

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOp {
    Add {
        description: String,
        due_text: String,
    },
    Modify {
        id: String,
        description: Option<String>,
        due_text: Option<String>,
    },
    Complete {
        id: String,
    },
    List {
        after: NaiveDate,
        before: NaiveDate,
    },
    CompletedExport,
}

impl TaskOp {
    pub fn args(&self) -> Vec<String> {
        match self {
            TaskOp::Add {
                description,
                due_text,
            } => vec![
                "add".to_string(),
                description.clone(),
                format!("due:{}", due_text),
            ],
            TaskOp::Modify {
                id,
                description,
                due_text,
            } => {
                let mut args = vec![id.clone(), "modify".to_string()];
                if let Some(description) = description {
                    args.push(format!("description:{}", description));
                }
                if let Some(due_text) = due_text {
                    args.push(format!("due:{}", due_text));
                }
                args
            }
            TaskOp::Complete { id } => vec![id.clone(), "done".to_string()],
            TaskOp::List { after, before } => vec![
                format!("due.after:{}", after.format("%Y-%m-%d")),
                format!("due.before:{}", before.format("%Y-%m-%d")),
                "export".to_string(),
            ],
            TaskOp::CompletedExport => vec!["status:completed".to_string(), "export".to_string()],
        }
    }
}

/// The caller must be able to tell "fix the input and retry" apart from
/// "stop, the tool itself is broken". `InvalidInput` feeds the repair loop;
/// the other two end the turn.
#[derive(Debug, Error)]
pub enum TaskCliError {
    #[error("the task tool rejected the input: {message}")]
    InvalidInput { message: String },

    #[error("the task tool rejected the request: {message}")]
    Rejected { message: String },

    #[error("the task tool is unavailable: {reason}")]
    ToolUnavailable { reason: String },
}

#[async_trait]
pub trait TaskCli: Send + Sync {
    async fn submit(&self, op: &TaskOp) -> Result<String, TaskCliError>;
}

/// Failure-text rule for spotting a date/time rejection: TaskWarrior phrases
/// these as "'X' is not a valid date", "not a valid duration", "is not
/// supported" for durations, or echoes the offending `due:` attribute.
/// Anything else on a non-zero exit is a plain `Rejected`.
static DATE_REJECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)not a valid (?:date|duration)|is not supported|unrecognized date|unable to parse|due:").unwrap()
});

pub(crate) fn is_date_rejection(message: &str) -> bool {
    DATE_REJECTION_RE.is_match(message)
}

pub struct TaskWarriorCli {
    bin: String,
    timeout: Duration,
}

impl TaskWarriorCli {
    pub fn new(bin: &str, timeout: Duration) -> Self {
        Self {
            bin: bin.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl TaskCli for TaskWarriorCli {
    async fn submit(&self, op: &TaskOp) -> Result<String, TaskCliError> {
        let args = op.args();
        debug!("Executing: {} {}", self.bin, args.join(" "));

        let mut cmd = Command::new(&self.bin);
        cmd.args(&args);
        cmd.kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_) => {
                return Err(TaskCliError::ToolUnavailable {
                    reason: format!("'{}' timed out after {:?}", self.bin, self.timeout),
                });
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TaskCliError::ToolUnavailable {
                    reason: format!("'{}' not found on PATH", self.bin),
                });
            }
            Ok(Err(e)) => {
                return Err(TaskCliError::ToolUnavailable {
                    reason: e.to_string(),
                });
            }
            Ok(Ok(output)) => output,
        };

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).to_string());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let message = format!("{} {}", stderr.trim(), stdout.trim())
            .trim()
            .to_string();

        if is_date_rejection(&message) {
            Err(TaskCliError::InvalidInput { message })
        } else {
            Err(TaskCliError::Rejected { message })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn add_args_forward_due_text_verbatim() {
        let op = TaskOp::Add {
            description: "Buy groceries".to_string(),
            due_text: "2024-07-03 at 15:00".to_string(),
        };
        assert_eq!(
            op.args(),
            vec!["add", "Buy groceries", "due:2024-07-03 at 15:00"]
        );
    }

    #[test]
    fn modify_args_only_include_changed_fields() {
        let op = TaskOp::Modify {
            id: "12".to_string(),
            description: None,
            due_text: Some("monday".to_string()),
        };
        assert_eq!(op.args(), vec!["12", "modify", "due:monday"]);
    }

    #[test]
    fn complete_and_export_args() {
        assert_eq!(
            TaskOp::Complete {
                id: "4".to_string()
            }
            .args(),
            vec!["4", "done"]
        );
        assert_eq!(
            TaskOp::CompletedExport.args(),
            vec!["status:completed", "export"]
        );
    }

    #[test]
    fn list_args_format_dates() {
        let op = TaskOp::List {
            after: date("2024-07-01"),
            before: date("2024-07-08"),
        };
        assert_eq!(
            op.args(),
            vec!["due.after:2024-07-01", "due.before:2024-07-08", "export"]
        );
    }

    #[test]
    fn date_rejections_are_recognized() {
        assert!(is_date_rejection("'noonish' is not a valid date."));
        assert!(is_date_rejection("The duration value 'soonish' is not supported."));
        assert!(is_date_rejection("Unable to parse the date in due:whenever"));
    }

    #[test]
    fn other_failures_are_not_date_rejections() {
        assert!(!is_date_rejection("Task not found."));
        assert!(!is_date_rejection("Configuration error: taskrc missing"));
    }

    #[tokio::test]
    async fn missing_binary_is_tool_unavailable() {
        let cli = TaskWarriorCli::new("definitely-not-a-real-task-binary", Duration::from_secs(2));
        let err = cli
            .submit(&TaskOp::Complete {
                id: "1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TaskCliError::ToolUnavailable { .. }));
    }
}
