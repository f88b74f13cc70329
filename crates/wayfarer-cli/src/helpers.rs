//! Shared CLI helpers: path expansion, response printing, version banner.

use std::path::PathBuf;

use colored::Colorize;

use wayfarer_agent::AgentProfile;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Heading printed above an agent's replies.
pub fn agent_title(profile: AgentProfile) -> String {
    format!("🧭 Wayfarer ({profile})")
}

/// Print a response to stdout under a heading.
pub fn print_response(title: &str, response: &str) {
    println!();
    println!("{}", title.cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(profile: AgentProfile) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", agent_title(profile).cyan().bold(), version.dimmed());
    println!(
        "{}",
        "Type a message, \"/reset\" to start over, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_home() {
        let result = expand_tilde("~/.wayfarer/workspace");
        assert!(result.ends_with(".wayfarer/workspace"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(expand_tilde("/srv/catalog.json"), PathBuf::from("/srv/catalog.json"));
        assert_eq!(expand_tilde("data/catalog.json"), PathBuf::from("data/catalog.json"));
    }

    #[test]
    fn test_expand_tilde_bare() {
        assert!(!expand_tilde("~").to_string_lossy().contains('~'));
    }

    #[test]
    fn test_agent_title() {
        assert_eq!(agent_title(AgentProfile::Budget), "🧭 Wayfarer (budget)");
    }
}
