//! `list_directory` tool — non-recursive listing of one directory.

use std::fmt::Write as _;

use serde::Deserialize;

use crate::error::{FileServerError, FileServerResult};
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::sandbox::Sandbox;

pub const NAME: &str = "list_directory";

#[derive(Debug, Default, Deserialize)]
pub struct ListDirectoryParams {
    /// Directory to list, relative to the root. Default: the root.
    #[serde(default)]
    pub path: Option<String>,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_owned(),
        description: "List files and directories in a given path".to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The path to the directory to list (optional, defaults to base directory)"
                }
            },
            "required": []
        }),
    }
}

pub fn execute(sandbox: &Sandbox, params: &ListDirectoryParams) -> FileServerResult<ToolCallResult> {
    let requested = params.path.as_deref().unwrap_or("");
    let dir = match sandbox.resolve(requested) {
        Ok(p) => p,
        Err(e) => return Ok(ToolCallResult::error(format!("Error: {e}"))),
    };

    let read_dir = std::fs::read_dir(&dir).and_then(|it| it.collect::<Result<Vec<_>, _>>());
    let mut entries = match read_dir {
        Ok(entries) => entries,
        Err(e) => {
            return Ok(match FileServerError::from_io(&dir, e) {
                FileServerError::NotFound { .. } => {
                    ToolCallResult::error(format!("Directory not found: {requested}"))
                }
                other => ToolCallResult::error(format!("Failed to list directory: {other}")),
            });
        }
    };
    entries.sort_by_key(std::fs::DirEntry::file_name);

    let mut output = String::new();
    match sandbox.relative(&dir) {
        Some(rel) if !rel.as_os_str().is_empty() => {
            let _ = writeln!(output, "Contents of {}:", rel.display());
        }
        _ => output.push_str("Contents of base directory:\n"),
    }

    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let is_dir = entry.file_type().is_ok_and(|ft| ft.is_dir());
        if is_dir {
            let _ = writeln!(output, "📁 {name}/");
        } else {
            match entry.metadata() {
                Ok(meta) => {
                    let _ = writeln!(output, "📄 {name} ({} bytes)", meta.len());
                }
                Err(_) => {
                    let _ = writeln!(output, "📄 {name}");
                }
            }
        }
    }

    Ok(ToolCallResult::text(output))
}
