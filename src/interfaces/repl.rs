//! Line-oriented interactive surface: one utterance in, one response out,
//! until the user types the exit sentinel. Each turn is fully resolved
//! before the next line is read.

use anyhow::Result;
use std::io::{self, BufRead, Write};

use crate::core::executor::{ActionExecutor, Response};
use crate::core::terminal::{self, print_error, print_info, print_success, print_warn};

pub async fn run(executor: &ActionExecutor) -> Result<()> {
    terminal::print_banner();
    println!("How can I help you today? (type 'exit' to quit)\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("you> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        if utterance.eq_ignore_ascii_case("exit") || utterance.eq_ignore_ascii_case("quit") {
            break;
        }

        let response = executor.handle(utterance).await;
        render(&response);
        println!();
    }
    Ok(())
}

pub fn render(response: &Response) {
    match response {
        Response::Succeeded { summary, insight } => {
            print_success(&format!("Done: {}", summary));
            if let Some(insight) = insight {
                print_info(&format!("Based on your completed tasks: {}", insight));
            }
        }
        Response::Answer(text) => {
            println!("{}", text);
        }
        Response::NeedsClarification(what) => {
            print_warn(what);
        }
        Response::NotUnderstood => {
            print_warn("I didn't understand that. Could you rephrase it?");
        }
        Response::Failed {
            reason,
            last_due_text,
        } => {
            print_error(&format!("Sorry, that didn't work: {}", reason));
            if let Some(last) = last_due_text {
                print_info(&format!("Last date/time I tried: {:?}", last));
            }
        }
    }
}
