//! `read_file` tool — whole-file text read inside the sandbox.

use serde::Deserialize;

use crate::error::{FileServerError, FileServerResult};
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::sandbox::Sandbox;

pub const NAME: &str = "read_file";

/// Parameters for the read_file tool.
#[derive(Debug, Deserialize)]
pub struct ReadFileParams {
    /// Path to the file, relative to the root.
    pub path: String,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_owned(),
        description: "Read the contents of a file".to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The path to the file to read"
                }
            },
            "required": ["path"]
        }),
    }
}

/// Execute the read_file tool.
pub fn execute(sandbox: &Sandbox, params: &ReadFileParams) -> FileServerResult<ToolCallResult> {
    let file_path = match sandbox.resolve(&params.path) {
        Ok(p) => p,
        Err(e) => return Ok(ToolCallResult::error(format!("Error: {e}"))),
    };

    let bytes = match std::fs::read(&file_path) {
        Ok(b) => b,
        Err(e) => {
            return Ok(match FileServerError::from_io(&file_path, e) {
                FileServerError::NotFound { .. } => {
                    ToolCallResult::error(format!("File not found: {}", params.path))
                }
                other => ToolCallResult::error(format!("Failed to read file: {other}")),
            });
        }
    };

    match String::from_utf8(bytes) {
        Ok(content) => Ok(ToolCallResult::text(format!(
            "Contents of {}:\n{content}",
            params.path
        ))),
        Err(e) => Ok(ToolCallResult::error(format!(
            "Binary file detected: {} ({} bytes)",
            params.path,
            e.as_bytes().len()
        ))),
    }
}
