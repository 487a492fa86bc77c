//! Orchestrates one user turn: classify the utterance, extract parameters,
//! and either drive a CLI-backed submission (with the bounded time-repair
//! loop wired in) or compose a direct model response. Every turn ends in a
//! `Response`; nothing here crashes the interactive loop.

use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::config::SecretaryConfig;
use crate::core::corrector::TimeCorrector;
use crate::core::extract::{self, QueryRange};
use crate::core::intent::{Intent, IntentClassifier};
use crate::core::llm::LlmProvider;
use crate::core::taskwarrior::{TaskCli, TaskCliError, TaskOp};

/// The outcome of one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A task operation went through. `summary` names what was touched;
    /// `insight` is an optional observation derived from completed tasks.
    Succeeded {
        summary: String,
        insight: Option<String>,
    },
    /// A free-text answer for the non-task intents.
    Answer(String),
    /// Required parameters could not be extracted; no CLI call was made.
    NeedsClarification(String),
    /// The classifier could not place the utterance.
    NotUnderstood,
    /// The operation failed. `last_due_text` carries the final candidate the
    /// repair loop submitted, shown to the user for transparency.
    Failed {
        reason: String,
        last_due_text: Option<String>,
    },
}

/// Terminal result of the repair state machine.
enum RepairOutcome {
    Succeeded { attempts: u32 },
    Failed {
        reason: String,
        last_due_text: String,
    },
}

pub struct ActionExecutor {
    classifier: IntentClassifier,
    corrector: TimeCorrector,
    provider: Arc<dyn LlmProvider>,
    cli: Arc<dyn TaskCli>,
    max_retries: u32,
    insights: bool,
}

impl ActionExecutor {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        cli: Arc<dyn TaskCli>,
        config: &SecretaryConfig,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(provider.clone()),
            corrector: TimeCorrector::new(provider.clone()),
            provider,
            cli,
            max_retries: config.max_retries.max(1),
            insights: config.insights,
        }
    }

    /// Resolve one utterance to one response.
    pub async fn handle(&self, utterance: &str) -> Response {
        let intent = match self.classifier.classify(utterance).await {
            Ok(intent) => intent,
            Err(e) => {
                return Response::Failed {
                    reason: e.to_string(),
                    last_due_text: None,
                };
            }
        };
        info!("Intent: {:?}", intent);

        match intent {
            Intent::AddTask => self.handle_add(utterance).await,
            Intent::ModifyTask => self.handle_modify(utterance).await,
            Intent::CompleteTask => self.handle_complete(utterance).await,
            Intent::QueryTask => self.handle_query(utterance).await,
            Intent::ProductivityTip | Intent::LocationQuery | Intent::GeneralQuery => {
                self.handle_freeform(intent, utterance).await
            }
            Intent::Unknown => Response::NotUnderstood,
        }
    }

    async fn handle_add(&self, utterance: &str) -> Response {
        let Some(params) = extract::extract_add(utterance) else {
            return Response::NeedsClarification(
                "I need a task description and a due date or time, e.g. \
                 'add task Buy groceries on 2024-07-03 at 15:00'."
                    .to_string(),
            );
        };

        let description = params.description.clone();
        let outcome = self
            .submit_with_repair(params.due_text, |due| TaskOp::Add {
                description: description.clone(),
                due_text: due.to_string(),
            })
            .await;

        match outcome {
            RepairOutcome::Succeeded { attempts } => {
                info!("Added task '{}' after {} attempt(s)", params.description, attempts);
                Response::Succeeded {
                    summary: params.description,
                    insight: self.completed_task_insight().await,
                }
            }
            RepairOutcome::Failed {
                reason,
                last_due_text,
                ..
            } => Response::Failed {
                reason,
                last_due_text: Some(last_due_text),
            },
        }
    }

    async fn handle_modify(&self, utterance: &str) -> Response {
        let Some(params) = extract::extract_modify(utterance) else {
            return Response::NeedsClarification(
                "Tell me the task number and what to change, e.g. \
                 'reschedule task 12 to friday 9am'."
                    .to_string(),
            );
        };

        let id = params.id.clone();
        let summary = format!("task {}", params.id);

        if let Some(due_text) = params.due_text {
            let description = params.description.clone();
            let outcome = self
                .submit_with_repair(due_text, |due| TaskOp::Modify {
                    id: id.clone(),
                    description: description.clone(),
                    due_text: Some(due.to_string()),
                })
                .await;
            match outcome {
                RepairOutcome::Succeeded { .. } => Response::Succeeded {
                    summary,
                    insight: self.completed_task_insight().await,
                },
                RepairOutcome::Failed {
                    reason,
                    last_due_text,
                    ..
                } => Response::Failed {
                    reason,
                    last_due_text: Some(last_due_text),
                },
            }
        } else {
            // No due text involved, so there is nothing for the repair loop
            // to do; a rejection here is final.
            let op = TaskOp::Modify {
                id,
                description: params.description,
                due_text: None,
            };
            match self.cli.submit(&op).await {
                Ok(_) => Response::Succeeded {
                    summary,
                    insight: self.completed_task_insight().await,
                },
                Err(e) => Response::Failed {
                    reason: e.to_string(),
                    last_due_text: None,
                },
            }
        }
    }

    async fn handle_complete(&self, utterance: &str) -> Response {
        let Some(params) = extract::extract_complete(utterance) else {
            return Response::NeedsClarification(
                "Tell me which task number to complete, e.g. 'complete task 4'.".to_string(),
            );
        };

        let summary = format!("task {}", params.id);
        match self.cli.submit(&TaskOp::Complete { id: params.id }).await {
            Ok(_) => Response::Succeeded {
                summary,
                insight: self.completed_task_insight().await,
            },
            Err(e) => Response::Failed {
                reason: e.to_string(),
                last_due_text: None,
            },
        }
    }

    async fn handle_query(&self, utterance: &str) -> Response {
        let range = extract::extract_query_range(utterance, Local::now().date_naive());
        match self.cli.submit(&TaskOp::List {
            after: range.after,
            before: range.before,
        })
        .await
        {
            Ok(export) => Response::Answer(render_task_export(&range, &export)),
            Err(e) => Response::Failed {
                reason: e.to_string(),
                last_due_text: None,
            },
        }
    }

    async fn handle_freeform(&self, intent: Intent, utterance: &str) -> Response {
        let prompt = match intent {
            Intent::ProductivityTip => format!(
                "The user has asked for help with productivity: \"{}\"\n\
                 Provide a helpful response with 2-3 practical tips for \
                 improving productivity, each with a concrete action the user \
                 can take today.",
                utterance
            ),
            Intent::LocationQuery => format!(
                "The user is looking for: \"{}\"\n\
                 Provide a helpful response suggesting 2-3 places or options \
                 related to their query.",
                utterance
            ),
            _ => format!(
                "The user has asked: \"{}\"\n\
                 Provide a helpful and informative response to this query.",
                utterance
            ),
        };

        match self.provider.complete(&prompt).await {
            Ok(text) => Response::Answer(text),
            Err(e) => Response::Failed {
                reason: e.to_string(),
                last_due_text: None,
            },
        }
    }

    /// The bounded repair state machine. Starting at attempt 1, submit the
    /// operation built from the current due text. On `InvalidInput` below the
    /// retry budget, ask the corrector for a new candidate and resubmit; on
    /// `ToolUnavailable` stop at once without invoking the corrector; on an
    /// exhausted budget report the last attempted text. At most
    /// `max_retries` submissions happen per request, and a corrected string
    /// is never reused outside this request.
    async fn submit_with_repair<F>(&self, due_text: String, build_op: F) -> RepairOutcome
    where
        F: Fn(&str) -> TaskOp,
    {
        let mut due_text = due_text;
        let mut attempt = 1u32;
        loop {
            let op = build_op(&due_text);
            match self.cli.submit(&op).await {
                Ok(_) => {
                    debug!(attempt, "task operation accepted");
                    return RepairOutcome::Succeeded { attempts: attempt };
                }
                Err(TaskCliError::InvalidInput { message }) if attempt < self.max_retries => {
                    warn!(attempt, %due_text, "due text rejected: {}", message);
                    match self.corrector.correct(&due_text, &message).await {
                        Ok(candidate) => {
                            due_text = candidate;
                            attempt += 1;
                        }
                        Err(e) => {
                            return RepairOutcome::Failed {
                                reason: format!("could not repair the date/time text: {}", e),
                                last_due_text: due_text,
                            };
                        }
                    }
                }
                Err(TaskCliError::InvalidInput { message }) => {
                    return RepairOutcome::Failed {
                        reason: format!(
                            "the task tool kept rejecting the date/time after {} attempts: {}",
                            attempt, message
                        ),
                        last_due_text: due_text,
                    };
                }
                Err(e @ TaskCliError::ToolUnavailable { .. }) => {
                    return RepairOutcome::Failed {
                        reason: e.to_string(),
                        last_due_text: due_text,
                    };
                }
                Err(e @ TaskCliError::Rejected { .. }) => {
                    return RepairOutcome::Failed {
                        reason: e.to_string(),
                        last_due_text: due_text,
                    };
                }
            }
        }
    }

    /// Optional observation derived from completed tasks, appended after a
    /// successful operation. Soft-fail on every step: any error only costs
    /// the insight, never the turn.
    async fn completed_task_insight(&self) -> Option<String> {
        if !self.insights {
            return None;
        }
        let export = match self.cli.submit(&TaskOp::CompletedExport).await {
            Ok(export) => export,
            Err(e) => {
                debug!("Skipping insight, completed export failed: {}", e);
                return None;
            }
        };
        let tasks: Vec<serde_json::Value> = serde_json::from_str(&export).unwrap_or_default();
        if tasks.is_empty() {
            return None;
        }
        let listing = tasks
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Based on the following completed tasks, provide one brief \
             insight or suggestion for the user:\n\n{}\n\nInsight:",
            listing
        );
        match self.provider.complete(&prompt).await {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                debug!("Skipping insight, model call failed: {}", e);
                None
            }
        }
    }
}

fn render_task_export(range: &QueryRange, export: &str) -> String {
    let tasks: Vec<serde_json::Value> = match serde_json::from_str(export) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!("Could not decode task export: {}", e);
            Vec::new()
        }
    };

    let header = format!("Your tasks from {} to {}:", range.after, range.before);
    if tasks.is_empty() {
        return format!("{}\n(nothing due)", header);
    }

    let mut lines = vec![header];
    for task in &tasks {
        let id = task.get("id").and_then(|v| v.as_u64()).unwrap_or(0);
        let description = task
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("(no description)");
        let due = task.get("due").and_then(|v| v.as_str()).unwrap_or("-");
        lines.push(format!("  [{}] {} (due {})", id, description, due));
    }
    lines.join("\n")
}
