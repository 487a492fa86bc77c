use anyhow::Result;
use std::time::Duration;

use crate::core::config::SecretaryConfig;
use crate::core::terminal::{print_status, print_step, print_success, print_warn};

/// Check the two external collaborators: the TaskWarrior binary and the
/// Ollama endpoint. Reports findings; never fails the process.
pub async fn run(config: &SecretaryConfig) -> Result<()> {
    print_step("Checking donna's external collaborators...");
    println!();

    match std::process::Command::new(&config.task_bin)
        .arg("--version")
        .output()
    {
        Ok(out) if out.status.success() => {
            print_success(&format!(
                "TaskWarrior is installed: {} {}",
                config.task_bin,
                String::from_utf8_lossy(&out.stdout).trim()
            ));
        }
        _ => {
            print_warn(&format!(
                "'{}' is not runnable. Task intents will fail until TaskWarrior is installed.",
                config.task_bin
            ));
        }
    }

    let url = format!(
        "{}/api/tags",
        config.ollama_base_url.trim_end_matches('/')
    );
    let client = reqwest::Client::new();
    match client
        .get(&url)
        .timeout(Duration::from_secs(5))
        .send()
        .await
    {
        Ok(res) if res.status().is_success() => {
            print_success(&format!("Ollama is reachable at {}", config.ollama_base_url));
            print_status("model", &config.model);
        }
        Ok(res) => {
            print_warn(&format!(
                "Ollama answered with status {} at {}",
                res.status(),
                url
            ));
        }
        Err(e) => {
            print_warn(&format!("Ollama is not reachable at {}: {}", url, e));
        }
    }

    Ok(())
}
