pub mod ollama;

use async_trait::async_trait;
use thiserror::Error;

/// The language model is a fallible collaborator: it can be unreachable, or
/// reachable but producing output we cannot use. Both are fatal for the
/// current turn and are surfaced to the user rather than retried.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model unreachable: {0}")]
    Unreachable(String),

    #[error("language model returned unusable output: {0}")]
    UnusableOutput(String),
}

/// A single synchronous text completion. Output is untrusted free text and
/// must be validated by the caller before it reaches the task tool.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
