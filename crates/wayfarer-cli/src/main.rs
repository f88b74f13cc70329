//! Wayfarer CLI: entry point.
//!
//! # Commands
//!
//! - `wayfarer plan -m REQUEST`: plan the request and run every step
//! - `wayfarer agent [-m MESSAGE] [--agent TYPE]`: chat with one agent (single-shot or REPL)
//! - `wayfarer onboard`: initialize config + workspace
//! - `wayfarer status`: show configuration and provider status

mod helpers;
mod onboard;
mod repl;
mod status;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use wayfarer_agent::{Agent, AgentProfile, AppContext};
use wayfarer_core::config::{get_config_path, load_config, Config};
use wayfarer_providers::{HttpProvider, LlmRequestConfig};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🧭 Wayfarer: multi-agent travel planner
#[derive(Parser)]
#[command(name = "wayfarer", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Break a request into a plan and execute it step by step
    Plan {
        /// The travel request to plan
        #[arg(short, long)]
        message: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Chat with one agent (single-shot or interactive REPL)
    Agent {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Which agent to talk to: general, flight, hotel, route or budget
        #[arg(short, long, default_value = "general")]
        agent: AgentProfile,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Initialize configuration and workspace
    Onboard,

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Plan { message, logs } => {
            init_logging(logs);
            run_plan(&message, logs).await
        }
        Commands::Agent {
            message,
            agent,
            logs,
        } => {
            init_logging(logs);
            run_agent(message, agent, logs).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    };

    if let Err(e) = result {
        eprintln!("\n{} {e:#}\n", "❌ Error:".red().bold());
        std::process::exit(1);
    }
}

// ─────────────────────────────────────────────
// Plan command
// ─────────────────────────────────────────────

async fn run_plan(request: &str, show_logs: bool) -> Result<()> {
    let ctx = build_context(load_config(None))?;
    let flow = ctx.flow().clone();

    // Ctrl-C stops the flow at the next step boundary.
    let watcher = {
        let flow = flow.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n{}", "Cancelling after the current step...".yellow());
                flow.cancel();
            }
        })
    };

    if !show_logs {
        helpers::print_thinking();
    }
    let outcome = flow.execute(request).await;
    watcher.abort();
    if !show_logs {
        helpers::clear_thinking();
    }

    let result = outcome.context("planning flow failed")?;
    helpers::print_response("🧭 Wayfarer", &result.output);
    println!(
        "{}",
        format!(
            "  {} steps completed in {:.1}s (plan {})",
            result.steps_completed,
            result.elapsed.as_secs_f64(),
            result.plan_id
        )
        .dimmed()
    );
    println!();
    Ok(())
}

// ─────────────────────────────────────────────
// Agent command
// ─────────────────────────────────────────────

async fn run_agent(message: Option<String>, profile: AgentProfile, show_logs: bool) -> Result<()> {
    let ctx = build_context(load_config(None))?;
    let agent = ctx.agent(profile);

    match message {
        Some(msg) => {
            info!(agent = agent.name(), "processing single message");
            if !show_logs {
                helpers::print_thinking();
            }
            let outcome = agent.run(&msg).await;
            if !show_logs {
                helpers::clear_thinking();
            }
            let response = outcome.context("agent processing failed")?;
            helpers::print_response(&helpers::agent_title(profile), &response);
        }
        None => repl::run(agent, profile, show_logs).await?,
    }

    Ok(())
}

/// Resolve paths, create the provider, and build every agent.
fn build_context(mut config: Config) -> Result<AppContext> {
    if !config.provider.is_configured() {
        bail!(
            "no API key configured. Set provider.apiKey in {} or WAYFARER_PROVIDER__API_KEY",
            get_config_path().display()
        );
    }

    let workspace = helpers::expand_tilde(&config.tools.workspace);
    std::fs::create_dir_all(&workspace)
        .with_context(|| format!("failed to create workspace: {}", workspace.display()))?;
    config.tools.catalog_path = config
        .tools
        .catalog_path
        .map(|p| helpers::expand_tilde(&p).display().to_string());

    let provider = HttpProvider::new(
        &config.provider,
        &config.agent.model,
        LlmRequestConfig {
            max_tokens: config.agent.max_tokens,
            temperature: config.agent.temperature,
        },
    )
    .context("failed to create provider")?;

    AppContext::new(config, Arc::new(provider), workspace)
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("wayfarer=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_command() {
        let cli = Cli::try_parse_from(["wayfarer", "plan", "-m", "2 days in Hangzhou"]).unwrap();
        match cli.command {
            Commands::Plan { message, logs } => {
                assert_eq!(message, "2 days in Hangzhou");
                assert!(!logs);
            }
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn test_parse_agent_profile() {
        let cli = Cli::try_parse_from(["wayfarer", "agent", "--agent", "hotel", "--logs"]).unwrap();
        match cli.command {
            Commands::Agent { message, agent, logs } => {
                assert!(message.is_none());
                assert_eq!(agent, AgentProfile::Hotel);
                assert!(logs);
            }
            _ => panic!("expected agent"),
        }
        assert!(Cli::try_parse_from(["wayfarer", "agent", "--agent", "weather"]).is_err());
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let err = build_context(Config::default()).err().unwrap();
        assert!(err.to_string().contains("no API key configured"));
    }
}
