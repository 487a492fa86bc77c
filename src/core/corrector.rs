//! LLM-backed repair of a rejected date/time string. One candidate per call;
//! the bounded retry loop that drives resubmission lives in the executor. The
//! model is a fallible repair oracle, never a source of truth: every candidate
//! it proposes is re-validated against the real tool.

use std::sync::Arc;
use tracing::debug;

use crate::core::llm::{LlmError, LlmProvider};

pub struct TimeCorrector {
    provider: Arc<dyn LlmProvider>,
}

impl TimeCorrector {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Ask for one corrected form of `original`, given the tool's complaint.
    /// The reply is reduced to its first non-empty line and stripped of
    /// quoting before it is handed back for resubmission.
    pub async fn correct(
        &self,
        original: &str,
        failure_message: &str,
    ) -> Result<String, LlmError> {
        let prompt = format!(
            "The following date/time description was rejected by a task tool.\n\
             Rejected text: \"{}\"\n\
             Tool complaint: \"{}\"\n\n\
             Rewrite it as a date/time the tool will accept, such as \
             '2024-07-03T15:00' or 'tomorrow 12:00'. \
             Respond with the corrected date/time string only.",
            original, failure_message
        );
        let reply = self.provider.complete(&prompt).await?;
        let candidate = clean_candidate(&reply);
        if candidate.is_empty() {
            return Err(LlmError::UnusableOutput(format!(
                "no usable correction in reply: {:?}",
                reply
            )));
        }
        debug!("Corrected {:?} -> {:?}", original, candidate);
        Ok(candidate)
    }
}

/// Models like to wrap answers in quotes, backticks, or trailing prose.
/// Keep the first non-empty line with its quoting removed.
fn clean_candidate(reply: &str) -> String {
    reply
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedReply(&'static str);

    #[async_trait]
    impl LlmProvider for FixedReply {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn strips_quotes_and_backticks() {
        assert_eq!(clean_candidate("\"tomorrow 12:00\""), "tomorrow 12:00");
        assert_eq!(clean_candidate("`2024-07-03T15:00`"), "2024-07-03T15:00");
    }

    #[test]
    fn keeps_first_non_empty_line() {
        assert_eq!(
            clean_candidate("\n2024-07-03T15:00\nThat should work better."),
            "2024-07-03T15:00"
        );
    }

    #[tokio::test]
    async fn correct_returns_cleaned_candidate() {
        let corrector = TimeCorrector::new(Arc::new(FixedReply("'tomorrow 12:00'")));
        let candidate = corrector
            .correct("tomorrow noonish", "'noonish' is not a valid date.")
            .await
            .unwrap();
        assert_eq!(candidate, "tomorrow 12:00");
    }

    #[tokio::test]
    async fn empty_reply_is_unusable_output() {
        let corrector = TimeCorrector::new(Arc::new(FixedReply("  \n \n")));
        let err = corrector.correct("noonish", "bad date").await.unwrap_err();
        assert!(matches!(err, LlmError::UnusableOutput(_)));
    }
}
