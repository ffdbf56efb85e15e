//! Tool router — registers and dispatches MCP tool calls.
//!
//! Arguments are decoded per tool into a [`ToolCall`] before anything runs.
//! Expected failures (missing files, denied paths, bad patterns) come back as
//! a [`ToolCallResult`] with `is_error` set, not as protocol errors.

pub mod list_directory;
pub mod read_file;
pub mod search_files;

use tracing::debug;

use crate::error::FileServerResult;
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::sandbox::Sandbox;

/// A decoded `tools/call` request.
#[derive(Debug)]
pub enum ToolCall {
    ReadFile(read_file::ReadFileParams),
    ListDirectory(list_directory::ListDirectoryParams),
    SearchFiles(search_files::SearchFilesParams),
    /// Name not in the registry; answered with a tool-level error.
    Unknown(String),
}

impl ToolCall {
    /// Decode `arguments` for the tool called `name`.
    ///
    /// Absent arguments are treated as an empty object.
    pub fn decode(name: &str, arguments: serde_json::Value) -> Result<Self, serde_json::Error> {
        let arguments = if arguments.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            arguments
        };
        Ok(match name {
            read_file::NAME => Self::ReadFile(serde_json::from_value(arguments)?),
            list_directory::NAME => Self::ListDirectory(serde_json::from_value(arguments)?),
            search_files::NAME => Self::SearchFiles(serde_json::from_value(arguments)?),
            other => Self::Unknown(other.to_owned()),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::ReadFile(_) => read_file::NAME,
            Self::ListDirectory(_) => list_directory::NAME,
            Self::SearchFiles(_) => search_files::NAME,
            Self::Unknown(name) => name.as_str(),
        }
    }
}

/// Tool router that dispatches MCP tool calls to implementations.
pub struct ToolRouter<'a> {
    sandbox: &'a Sandbox,
}

impl<'a> ToolRouter<'a> {
    /// Create a new tool router over `sandbox`.
    pub const fn new(sandbox: &'a Sandbox) -> Self {
        Self { sandbox }
    }

    /// List all available tools with their JSON Schema definitions.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        vec![
            read_file::tool_definition(),
            list_directory::tool_definition(),
            search_files::tool_definition(),
        ]
    }

    /// Run an already-decoded tool call.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures the tool does not report itself;
    /// the caller turns those into a tool-level error result.
    pub fn call(&self, call: ToolCall) -> FileServerResult<ToolCallResult> {
        debug!(tool = call.name(), "dispatching tool call");

        match call {
            ToolCall::ReadFile(params) => read_file::execute(self.sandbox, &params),
            ToolCall::ListDirectory(params) => list_directory::execute(self.sandbox, &params),
            ToolCall::SearchFiles(params) => search_files::execute(self.sandbox, &params),
            ToolCall::Unknown(name) => Ok(ToolCallResult::error(format!("Unknown tool: {name}"))),
        }
    }

    /// Decode and run a tool call by name.
    pub fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> FileServerResult<ToolCallResult> {
        self.call(ToolCall::decode(name, arguments)?)
    }
}
