//! Interactive REPL against a single agent.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use wayfarer_agent::{Agent, AgentLoop, AgentProfile};

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

const RESET_COMMAND: &str = "/reset";

/// Run the interactive REPL loop.
pub async fn run(agent: Arc<AgentLoop>, profile: AgentProfile, show_logs: bool) -> Result<()> {
    helpers::print_banner(profile);

    let mut editor = create_editor()?;
    let title = helpers::agent_title(profile);

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nGoodbye! 👋");
            break;
        }

        let _ = editor.add_history_entry(&input);

        if trimmed.eq_ignore_ascii_case(RESET_COMMAND) {
            match agent.reset() {
                Ok(()) => println!("\n{}\n", reset_notice()),
                Err(e) => eprintln!("\n❌ Error: {e}\n"),
            }
            continue;
        }

        debug!(agent = agent.name(), input = trimmed, "processing input");
        if !show_logs {
            helpers::print_thinking();
        }
        let outcome = agent.run(trimmed).await;
        if !show_logs {
            helpers::clear_thinking();
        }

        match outcome {
            Ok(response) => helpers::print_response(&title, &response),
            Err(e) => eprintln!("\n❌ Error: {e}\n"),
        }
    }

    save_history(&mut editor);
    Ok(())
}

fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

fn history_path() -> std::path::PathBuf {
    wayfarer_core::utils::get_history_path().join("cli_history")
}

fn reset_notice() -> String {
    "Conversation cleared.".dimmed().to_string()
}

fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
