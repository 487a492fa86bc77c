mod doctor;

use anyhow::Result;
use console::style;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::SecretaryConfig;
use crate::core::executor::ActionExecutor;
use crate::core::llm::ollama::OllamaProvider;
use crate::core::taskwarrior::TaskWarriorCli;
use crate::core::terminal::{self, GuideSection, print_error};
use crate::interfaces::repl;

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Core")
        .command("repl", "Start the interactive session (default)")
        .command("run", "Resolve a single utterance (-p \"...\")")
        .print();

    GuideSection::new("Diagnostics")
        .command("doctor", "Check TaskWarrior and the Ollama endpoint")
        .command("help", "Show this help")
        .print();

    println!(
        " {} {} <command> [options]\n",
        style("Usage:").bold(),
        style("donna").green()
    );
}

pub(crate) fn parse_run_prompt(args: &[String], start: usize) -> String {
    let mut prompt = String::new();
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--prompt" | "-p" => {
                if i + 1 < args.len() {
                    prompt = args[i + 1].clone();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    prompt
}

fn build_executor(config: &SecretaryConfig) -> Result<ActionExecutor> {
    let provider = OllamaProvider::new(
        &config.ollama_base_url,
        &config.model,
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    let cli = TaskWarriorCli::new(&config.task_bin, Duration::from_secs(config.cli_timeout_secs));
    Ok(ActionExecutor::new(
        Arc::new(provider),
        Arc::new(cli),
        config,
    ))
}

pub async fn run_main() -> Result<()> {
    crate::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("repl");

    match command {
        "repl" => {
            let config = SecretaryConfig::load()?;
            let executor = build_executor(&config)?;
            repl::run(&executor).await
        }
        "run" => {
            let prompt = parse_run_prompt(&args, 2);
            if prompt.is_empty() {
                print_error("Usage: donna run -p \"<utterance>\"");
                return Ok(());
            }
            let config = SecretaryConfig::load()?;
            let executor = build_executor(&config)?;
            let response = executor.handle(&prompt).await;
            repl::render(&response);
            Ok(())
        }
        "doctor" => {
            let config = SecretaryConfig::load()?;
            doctor::run(&config).await
        }
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        other => {
            print_error(&format!("Unknown command: {}", other));
            print_help();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_run_prompt_long_and_short() {
        let args = argv(&["donna", "run", "--prompt", "add task x on friday"]);
        assert_eq!(parse_run_prompt(&args, 2), "add task x on friday");

        let args = argv(&["donna", "run", "-p", "hello"]);
        assert_eq!(parse_run_prompt(&args, 2), "hello");
    }

    #[test]
    fn parse_run_prompt_missing_value_is_empty() {
        let args = argv(&["donna", "run", "-p"]);
        assert_eq!(parse_run_prompt(&args, 2), "");

        let args = argv(&["donna", "run"]);
        assert_eq!(parse_run_prompt(&args, 2), "");
    }
}
