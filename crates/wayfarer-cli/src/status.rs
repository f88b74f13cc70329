//! `wayfarer status`: show configuration, provider, and catalog status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use wayfarer_agent::tools::travel::Catalog;
use wayfarer_core::config::{get_config_path, load_config};

use crate::helpers::expand_tilde;

fn found(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🧭 Wayfarer Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        found(config_path.exists())
    );

    let workspace = expand_tilde(&config.tools.workspace);
    println!(
        "  {:<18} {} {}",
        "Workspace:".bold(),
        workspace.display(),
        found(workspace.exists())
    );
    if config.tools.restrict_to_workspace {
        println!("  {:<18} {}", "", "file tools restricted to workspace".dimmed());
    }

    println!("  {:<18} {}", "Model:".bold(), config.agent.model);
    println!(
        "  {:<18} {} | {}",
        "Parameters:".bold(),
        format!("temp: {}", config.agent.temperature).dimmed(),
        format!("max_tokens: {}", config.agent.max_tokens).dimmed(),
    );
    println!(
        "  {:<18} {} | {}",
        "Agent limits:".bold(),
        format!("max_steps: {}", config.agent.max_steps).dimmed(),
        format!("max_messages: {}", config.agent.max_messages).dimmed(),
    );

    println!();
    let key_status = if config.provider.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<18} {}", "Provider:".bold(), key_status);
    if let Some(base) = &config.provider.api_base {
        println!("  {:<18} {}", "API base:".bold(), base);
    }

    let catalog_status = match config.tools.catalog_path.as_deref() {
        None => format!("{}", "· not configured".dimmed()),
        Some(raw) => catalog_summary(&expand_tilde(raw)),
    };
    println!("  {:<18} {}", "Travel catalog:".bold(), catalog_status);

    println!();
    Ok(())
}

fn catalog_summary(path: &Path) -> String {
    match Catalog::load(path) {
        Ok(catalog) => format!(
            "{} {} ({} flights, {} hotels)",
            "✓".green(),
            path.display(),
            catalog.flights.len(),
            catalog.hotels.len()
        ),
        Err(e) => format!("{} {}", "✗".red(), format!("{e:#}").red()),
    }
}
