//! Utility helpers: data directory resolution and string trimming.

use std::path::PathBuf;

/// Get the Wayfarer data directory (e.g. `~/.wayfarer/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".wayfarer")
}

/// Get the default workspace path (e.g. `~/.wayfarer/workspace/`).
pub fn get_default_workspace_path() -> PathBuf {
    get_data_path().join("workspace")
}

/// Get the REPL history directory (e.g. `~/.wayfarer/history/`).
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate_string("plan a two day trip to hangzhou", 15);
        assert_eq!(result, "plan a two d...");
        assert_eq!(result.chars().count(), 15);
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate_string("杭州两日游行程规划", 5), "杭州...");
    }

    #[test]
    fn test_data_paths() {
        let data = get_data_path();
        assert!(data.ends_with(".wayfarer"));
        assert!(get_default_workspace_path().starts_with(&data));
        assert!(get_history_path().ends_with("history"));
    }
}
