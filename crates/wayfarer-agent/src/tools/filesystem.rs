//! File tools: read, write and list inside the agent workspace.
//!
//! Used by the general agent to save itineraries and read back notes.
//! Relative paths resolve against the workspace root; when the workspace is
//! restricted, anything resolving outside it is refused.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use wayfarer_core::utils::truncate_string;
use wayfarer_core::value::Arguments;

use super::base::{Tool, ToolResult};

/// Longest file body returned to the model.
const MAX_READ_CHARS: usize = 20_000;

// ─────────────────────────────────────────────
// Workspace
// ─────────────────────────────────────────────

/// Root directory shared by the file tools.
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
    restrict: bool,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, restrict: bool) -> Self {
        Self {
            root: root.into(),
            restrict,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied path against the workspace.
    ///
    /// `..` components are folded lexically first. When restricted, the
    /// result and the root are then canonicalized (up to their deepest
    /// existing ancestor, so new files can still be checked) before the
    /// containment test, which follows symlinks out of the workspace.
    pub fn resolve(&self, path: &str) -> anyhow::Result<PathBuf> {
        let candidate = Path::new(path);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };
        let resolved = normalize(&joined);
        if !self.restrict {
            return Ok(resolved);
        }

        let resolved = canonicalize_existing(&resolved);
        let root = canonicalize_existing(&normalize(&self.root));
        if !resolved.starts_with(&root) {
            anyhow::bail!(
                "Access denied: path '{}' is outside the workspace '{}'",
                resolved.display(),
                root.display()
            );
        }
        Ok(resolved)
    }
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest.
fn canonicalize_existing(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn path_schema(description: &str) -> JsonValue {
    json!({ "type": "string", "description": description })
}

// ─────────────────────────────────────────────
// ReadFileTool
// ─────────────────────────────────────────────

/// Reads a text file from the workspace.
pub struct ReadFileTool {
    workspace: Arc<Workspace>,
}

impl ReadFileTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a text file from the workspace, such as a saved itinerary or notes."
    }

    fn parameters(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "path": path_schema("File path, relative to the workspace")
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let path = self.workspace.resolve(args.require_str("path")?)?;

        if !path.is_file() {
            return Ok(ToolResult::error(format!("File not found: {}", path.display())));
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        Ok(ToolResult::success(truncate_string(&content, MAX_READ_CHARS)))
    }
}

// ─────────────────────────────────────────────
// WriteFileTool
// ─────────────────────────────────────────────

/// Creates or overwrites a file in the workspace.
pub struct WriteFileTool {
    workspace: Arc<Workspace>,
}

impl WriteFileTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write text to a file in the workspace (e.g. a finished itinerary). \
         Creates parent directories and overwrites existing files."
    }

    fn parameters(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "path": path_schema("File path, relative to the workspace"),
                "content": { "type": "string", "description": "Text to write" }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let path = self.workspace.resolve(args.require_str("path")?)?;
        let content = args.require_str("content")?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create directory {}: {e}", parent.display()))?;
        }

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
        Ok(
            ToolResult::success(format!("Wrote {} bytes to {}", content.len(), path.display()))
                .with_metadata("bytes", content.len()),
        )
    }
}

// ─────────────────────────────────────────────
// ListDirTool
// ─────────────────────────────────────────────

/// Lists the contents of a workspace directory.
pub struct ListDirTool {
    workspace: Arc<Workspace>,
}

impl ListDirTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ListDirTool {
    fn name(&self) -> &str {
        "list_dir"
    }

    fn description(&self) -> &str {
        "List a workspace directory. Defaults to the workspace root."
    }

    fn parameters(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "path": path_schema("Directory path, relative to the workspace (default: root)")
            },
            "required": []
        })
    }

    async fn execute(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let path = self.workspace.resolve(args.optional_str("path")?.unwrap_or("."))?;

        if !path.is_dir() {
            return Ok(ToolResult::error(format!("Not a directory: {}", path.display())));
        }

        let mut reader = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {e}", path.display()))?;

        let mut entries: Vec<(String, bool)> = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let is_dir = entry.file_type().await.map(|ft| ft.is_dir()).unwrap_or(false);
            entries.push((entry.file_name().to_string_lossy().to_string(), is_dir));
        }
        entries.sort();

        if entries.is_empty() {
            return Ok(ToolResult::success("(empty directory)"));
        }
        let listing: Vec<String> = entries
            .into_iter()
            .map(|(name, is_dir)| if is_dir { format!("📁 {name}") } else { format!("📄 {name}") })
            .collect();
        Ok(ToolResult::success(listing.join("\n")))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(dir: &Path, restrict: bool) -> Arc<Workspace> {
        Arc::new(Workspace::new(dir, restrict))
    }

    #[test]
    fn test_resolve_relative_and_parent() {
        let ws = Workspace::new("/data/ws", true);
        assert_eq!(ws.resolve("trips/a.md").unwrap(), PathBuf::from("/data/ws/trips/a.md"));
        assert_eq!(ws.resolve("trips/../b.md").unwrap(), PathBuf::from("/data/ws/b.md"));
        assert!(ws.resolve("../escape.md").is_err());
        assert!(ws.resolve("/etc/passwd").is_err());
    }

    #[test]
    fn test_resolve_unrestricted() {
        let ws = Workspace::new("/data/ws", false);
        assert_eq!(ws.resolve("/etc/hosts").unwrap(), PathBuf::from("/etc/hosts"));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path(), true);

        let written = WriteFileTool::new(ws.clone())
            .execute(
                &Arguments::new()
                    .with("path", "trips/hangzhou.md")
                    .with("content", "Day 1: West Lake"),
            )
            .await
            .unwrap();
        assert!(written.output.unwrap().contains("Wrote 16 bytes"));

        let read = ReadFileTool::new(ws)
            .execute(&Arguments::new().with("path", "trips/hangzhou.md"))
            .await
            .unwrap();
        assert_eq!(read.output.as_deref(), Some("Day 1: West Lake"));
    }

    #[tokio::test]
    async fn test_read_missing_is_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let result = ReadFileTool::new(workspace(dir.path(), true))
            .execute(&Arguments::new().with("path", "nope.md"))
            .await
            .unwrap();
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[tokio::test]
    async fn test_write_outside_workspace_denied() {
        let dir = tempfile::tempdir().unwrap();
        let err = WriteFileTool::new(workspace(dir.path(), true))
            .execute(&Arguments::new().with("path", "../x.md").with("content", "x"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Access denied"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_out_of_workspace_denied() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "TOP SECRET").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        let ws = workspace(dir.path(), true);

        let err = ReadFileTool::new(ws.clone())
            .execute(&Arguments::new().with("path", "link/secret.txt"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Access denied"));

        let err = WriteFileTool::new(ws)
            .execute(&Arguments::new().with("path", "link/new.md").with("content", "x"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Access denied"));
        assert!(!outside.path().join("new.md").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_inside_workspace_allowed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("trips")).unwrap();
        std::fs::write(dir.path().join("trips/plan.md"), "West Lake").unwrap();
        std::os::unix::fs::symlink(dir.path().join("trips"), dir.path().join("current")).unwrap();

        let read = ReadFileTool::new(workspace(dir.path(), true))
            .execute(&Arguments::new().with("path", "current/plan.md"))
            .await
            .unwrap();
        assert_eq!(read.output.as_deref(), Some("West Lake"));
    }

    #[tokio::test]
    async fn test_list_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.md"), "").unwrap();
        std::fs::create_dir(dir.path().join("trips")).unwrap();

        let result = ListDirTool::new(workspace(dir.path(), true))
            .execute(&Arguments::new())
            .await
            .unwrap();
        let out = result.output.unwrap();
        assert!(out.contains("📄 notes.md"));
        assert!(out.contains("📁 trips"));
    }

    #[tokio::test]
    async fn test_list_dir_empty() {
        let dir = tempfile::tempdir().unwrap();
        let result = ListDirTool::new(workspace(dir.path(), true))
            .execute(&Arguments::new().with("path", "."))
            .await
            .unwrap();
        assert_eq!(result.output.as_deref(), Some("(empty directory)"));
    }
}
