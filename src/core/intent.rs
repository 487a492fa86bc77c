use std::sync::Arc;
use tracing::debug;

use crate::core::llm::{LlmError, LlmProvider};

/// The closed set of utterance categories. Classification is total: anything
/// the model cannot place lands on `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    AddTask,
    ModifyTask,
    CompleteTask,
    QueryTask,
    ProductivityTip,
    LocationQuery,
    GeneralQuery,
    Unknown,
}

impl Intent {
    /// Every label the model may legitimately answer with. `Unknown` is the
    /// fallback, never a prompt option the model is asked to justify picking.
    pub const CLASSIFIABLE: [Intent; 7] = [
        Intent::AddTask,
        Intent::ModifyTask,
        Intent::CompleteTask,
        Intent::QueryTask,
        Intent::ProductivityTip,
        Intent::LocationQuery,
        Intent::GeneralQuery,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Intent::AddTask => "ADD_TASK",
            Intent::ModifyTask => "MODIFY_TASK",
            Intent::CompleteTask => "COMPLETE_TASK",
            Intent::QueryTask => "QUERY_TASK",
            Intent::ProductivityTip => "PRODUCTIVITY_TIP",
            Intent::LocationQuery => "LOCATION_QUERY",
            Intent::GeneralQuery => "GENERAL_QUERY",
            Intent::Unknown => "UNKNOWN",
        }
    }
}

pub struct IntentClassifier {
    provider: Arc<dyn LlmProvider>,
}

impl IntentClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// One model round trip, no retries at this layer. Transport failures
    /// bubble up; unmatched replies degrade to `Intent::Unknown`.
    pub async fn classify(&self, utterance: &str) -> Result<Intent, LlmError> {
        let prompt = build_classification_prompt(utterance);
        let reply = self.provider.complete(&prompt).await?;
        let intent = match_label(&reply);
        debug!("Classifier reply {:?} mapped to {:?}", reply, intent);
        Ok(intent)
    }
}

fn build_classification_prompt(utterance: &str) -> String {
    format!(
        "Classify the following user input into one of these intents:\n\
         - ADD_TASK: for adding a new task or todo with a due date\n\
         - MODIFY_TASK: for changing or rescheduling an existing task\n\
         - COMPLETE_TASK: for marking a task as done\n\
         - QUERY_TASK: for checking tasks or listing what is due\n\
         - PRODUCTIVITY_TIP: for questions about being more productive\n\
         - LOCATION_QUERY: for finding places or location-based information\n\
         - GENERAL_QUERY: for general questions not fitting the above\n\n\
         User input: \"{}\"\n\n\
         Respond with the single best intent label.",
        utterance
    )
}

/// Map a model reply to an intent. The reply is normalized (uppercased,
/// whitespace collapsed) and scanned for the earliest canonical label, so a
/// reply like "I would pick ADD_TASK because ..." still resolves. Labels are
/// also matched with underscores spelled as spaces ("ADD TASK").
pub(crate) fn match_label(reply: &str) -> Intent {
    let normalized = reply
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();

    for intent in Intent::CLASSIFIABLE {
        if normalized == intent.label() {
            return intent;
        }
    }

    let mut best: Option<(usize, Intent)> = None;
    for intent in Intent::CLASSIFIABLE {
        let spaced = intent.label().replace('_', " ");
        let pos = match (normalized.find(intent.label()), normalized.find(&spaced)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };
        if let Some(pos) = pos
            && best.map(|(p, _)| pos < p).unwrap_or(true)
        {
            best = Some((pos, intent));
        }
    }
    best.map(|(_, intent)| intent).unwrap_or(Intent::Unknown)
}
