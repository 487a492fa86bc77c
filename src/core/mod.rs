pub mod config;
pub mod corrector;
pub mod executor;
pub mod extract;
pub mod intent;
pub mod llm;
pub mod taskwarrior;
pub mod terminal;
