//! MCP Server — stdio transport, JSON-RPC 2.0, newline-delimited.
//!
//! Reads one JSON-RPC message per line, routes it through the method table
//! in [`crate::protocol`], and writes at most one response line per message.
//! Requests are handled strictly one at a time, in arrival order.
//!
//! Protocol flow:
//! 1. Client sends `initialize` → server responds with capabilities
//! 2. Client sends `notifications/initialized` (no response)
//! 3. Client sends `resources/list` / `resources/read`
//! 4. Client sends `tools/list` / `tools/call`
//! 5. Client closes stdin → server exits
//!
//! Lines that are not valid JSON are logged and dropped without a reply:
//! no `id` can be recovered from them.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::protocol::{
    self, ErrorCode, InitializeParams, InitializeResult, JSONRPC_VERSION, JsonRpcRequest,
    JsonRpcResponse, ListResourcesResult, ReadResourceParams, ReadResourceResult, Request,
    ResourcesCapability, ServerCapabilities, ServerInfo, ToolCallResult, ToolsCapability,
    ToolsListResult,
};
use crate::resources;
use crate::sandbox::Sandbox;
use crate::tools::{ToolCall, ToolRouter};
use crate::util::framing::{DEFAULT_MAX_LINE_BYTES, Frame, FrameReader, FrameWriter};

// ---------------------------------------------------------------------------
// MCP Server configuration
// ---------------------------------------------------------------------------

/// Configuration for the MCP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory exposed to the client. Nothing outside it is reachable.
    pub root: PathBuf,
    /// Inbound lines longer than this are dropped.
    pub max_line_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Stateless request dispatcher bound to one sandbox root.
#[derive(Debug)]
pub struct Server {
    sandbox: Sandbox,
    max_line_bytes: usize,
}

impl Server {
    /// Build a server, canonicalizing the root.
    ///
    /// # Errors
    ///
    /// Fails if the root does not exist or is not a directory.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let sandbox = Sandbox::new(&config.root)
            .with_context(|| format!("invalid root directory {}", config.root.display()))?;
        Ok(Self {
            sandbox,
            max_line_bytes: config.max_line_bytes,
        })
    }

    pub const fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Serve requests from `input` until EOF, writing responses to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading `input` or writing `output` fails.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, output: W) -> Result<()> {
        let mut reader = FrameReader::new(input, self.max_line_bytes);
        let mut writer = FrameWriter::new(output);

        while let Some(frame) = reader.read_frame().context("failed to read from input")? {
            let line = match frame {
                Frame::Line(line) => line,
                Frame::Oversized { len } => {
                    warn!(len, limit = self.max_line_bytes, "discarding oversized line");
                    continue;
                }
                Frame::InvalidUtf8 => {
                    warn!("discarding non-UTF-8 line");
                    continue;
                }
            };

            if let Some(response) = self.handle_line(&line) {
                writer.write_message(&response)?;
            }
        }

        info!("input closed, shutting down");
        Ok(())
    }

    /// Handle one inbound line. Returns the response to send, if any.
    pub fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        debug!(raw = trimmed, "received message");

        let value: serde_json::Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "discarding line: invalid JSON");
                return None;
            }
        };

        // serde would also accept a JSON array for the envelope struct.
        if !value.is_object() {
            warn!("discarding line: JSON-RPC envelope must be an object");
            return None;
        }

        let raw_id = value.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "malformed JSON-RPC envelope");
                return raw_id.map(|id| {
                    JsonRpcResponse::error(
                        Some(id),
                        ErrorCode::InvalidRequest,
                        format!("invalid request: {e}"),
                    )
                });
            }
        };

        let response = self.dispatch(&request)?;
        if request.id.is_none() {
            debug!(method = request.method, "request without id, response suppressed");
            return None;
        }
        Some(response)
    }

    /// Route a parsed envelope. `None` means nothing is sent back.
    fn dispatch(&self, req: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        // JSON-RPC 2.0: "jsonrpc" MUST be exactly "2.0".
        if req.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
            warn!(version = req.jsonrpc, "invalid JSON-RPC version (expected \"2.0\")");
            return Some(JsonRpcResponse::error(
                req.id.clone(),
                ErrorCode::InvalidRequest,
                "invalid request: jsonrpc version must be \"2.0\"",
            ));
        }

        let Some(method) = req.method.as_deref() else {
            warn!("request without method");
            return Some(JsonRpcResponse::error(
                req.id.clone(),
                ErrorCode::InvalidRequest,
                "invalid request: missing method",
            ));
        };

        let Some(entry) = protocol::lookup(method) else {
            warn!(method, "unknown method");
            return Some(JsonRpcResponse::error(
                req.id.clone(),
                ErrorCode::MethodNotFound,
                format!("Method not found: {method}"),
            ));
        };

        info!(method, id = ?req.id, "handling request");

        let request = match (entry.decode)(req.params.clone()) {
            Ok(r) => r,
            Err(e) if entry.notification => {
                warn!(method, error = %e, "ignoring notification with invalid params");
                return None;
            }
            Err(e) => {
                warn!(method, error = %e, "invalid params");
                return Some(JsonRpcResponse::error(
                    req.id.clone(),
                    ErrorCode::InvalidParams,
                    format!("invalid {method} params: {e}"),
                ));
            }
        };

        let response = self.handle(req.id.clone(), request);
        if entry.notification {
            debug!(method, "notification handled (no response)");
            return None;
        }
        response
    }

    fn handle(&self, id: Option<serde_json::Value>, request: Request) -> Option<JsonRpcResponse> {
        let response = match request {
            Request::Initialize(params) => handle_initialize(id, &params),
            Request::Initialized => {
                info!("client initialized");
                return None;
            }
            Request::ListResources => self.handle_resources_list(id),
            Request::ReadResource(params) => self.handle_resources_read(id, &params),
            Request::ListTools => handle_tools_list(&ToolRouter::new(&self.sandbox), id),
            Request::CallTool(call) => self.handle_tools_call(id, call),
        };
        Some(response)
    }

    fn handle_resources_list(&self, id: Option<serde_json::Value>) -> JsonRpcResponse {
        info!(root = %self.sandbox.root().display(), "listing resources");
        match resources::list(&self.sandbox) {
            Ok(resources) => {
                info!(count = resources.len(), "found resources");
                JsonRpcResponse::success(id, &ListResourcesResult { resources })
            }
            Err(e) => {
                warn!(error = %e, "failed to list resources");
                JsonRpcResponse::error(id, e.code(), format!("Failed to list resources: {e}"))
            }
        }
    }

    fn handle_resources_read(
        &self,
        id: Option<serde_json::Value>,
        params: &ReadResourceParams,
    ) -> JsonRpcResponse {
        info!(uri = params.uri, "reading resource");
        match resources::read(&self.sandbox, &params.uri) {
            Ok(content) => JsonRpcResponse::success(
                id,
                &ReadResourceResult {
                    contents: vec![content],
                },
            ),
            Err(e) => {
                warn!(uri = params.uri, error = %e, "resource read failed");
                JsonRpcResponse::error(id, e.code(), e.to_string())
            }
        }
    }

    fn handle_tools_call(&self, id: Option<serde_json::Value>, call: ToolCall) -> JsonRpcResponse {
        let tool = call.name().to_owned();
        info!(tool, "calling tool");
        let result = match ToolRouter::new(&self.sandbox).call(call) {
            Ok(result) => result,
            Err(e) => {
                warn!(tool, error = %e, "tool call failed");
                ToolCallResult::error(format!("Error: {e}"))
            }
        };
        if result.is_error {
            debug!(tool, "tool reported an error result");
        }
        JsonRpcResponse::success(id, &result)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_initialize(id: Option<serde_json::Value>, params: &InitializeParams) -> JsonRpcResponse {
    info!(
        client = params.client_info.name,
        client_version = params.client_info.version,
        protocol_version = params.protocol_version,
        "initialize request"
    );

    let result = InitializeResult {
        protocol_version: protocol::PROTOCOL_VERSION.to_owned(),
        capabilities: ServerCapabilities {
            resources: ResourcesCapability {
                subscribe: false,
                list_changed: false,
            },
            tools: ToolsCapability {
                list_changed: false,
            },
        },
        server_info: ServerInfo {
            name: env!("CARGO_PKG_NAME").to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        },
    };

    JsonRpcResponse::success(id, &result)
}

fn handle_tools_list(router: &ToolRouter<'_>, id: Option<serde_json::Value>) -> JsonRpcResponse {
    let tools = router.list_tools();
    debug!(count = tools.len(), "returning tools");
    JsonRpcResponse::success(id, &ToolsListResult { tools })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the MCP server on stdin/stdout.
///
/// Exits when stdin is closed.
///
/// # Errors
///
/// Returns an error if the root is invalid or stdin/stdout I/O fails fatally.
pub fn run_mcp_server(config: &ServerConfig) -> Result<()> {
    let server = Server::new(config)?;
    info!(
        root = %server.sandbox().root().display(),
        "oa-fileserver MCP server starting"
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    server.serve(stdin.lock(), stdout.lock())?;

    info!("oa-fileserver MCP server stopped");
    Ok(())
}
