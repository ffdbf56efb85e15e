//! JSON-RPC 2.0 envelopes and MCP message types.
//!
//! Inbound requests are decoded once, through [`METHODS`], into a typed
//! [`Request`]. Handlers only ever see well-formed parameter records.

use serde::{Deserialize, Serialize};

use crate::tools::ToolCall;

/// Protocol version reported in the `initialize` response.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC version tag carried on every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 types
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 request or notification, as read off the wire.
///
/// Fields are optional so a structurally incomplete envelope still yields
/// its `id` for the error reply.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Successful response carrying `result`.
    ///
    /// Serialization failure of `result` becomes an `InternalError` response.
    pub fn success(id: Option<serde_json::Value>, result: &impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(v) => Self {
                jsonrpc: JSONRPC_VERSION.to_owned(),
                id,
                result: Some(v),
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize success response");
                Self::error(
                    id,
                    ErrorCode::InternalError,
                    format!("internal error: failed to serialize result: {e}"),
                )
            }
        }
    }

    /// Error response.
    pub fn error(id: Option<serde_json::Value>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: code.code(),
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Reserved JSON-RPC error codes used by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl ErrorCode {
    pub const fn code(self) -> i64 {
        match self {
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }
}

// ---------------------------------------------------------------------------
// MCP protocol types
// ---------------------------------------------------------------------------

/// `initialize` params. All three fields are required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: ClientCapabilities,
    pub client_info: ClientInfo,
}

/// Client capabilities; accepted but not acted on.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    #[serde(default)]
    pub roots: Option<serde_json::Value>,
    #[serde(default)]
    pub sampling: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// MCP server info returned in initialize response.
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// MCP server capabilities.
#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub resources: ResourcesCapability,
    pub tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    pub subscribe: bool,
    pub list_changed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

/// MCP initialize result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// A file under the root, as listed by `resources/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// MCP resources/list result.
#[derive(Debug, Serialize)]
pub struct ListResourcesResult {
    pub resources: Vec<Resource>,
}

/// MCP resources/read params.
#[derive(Debug, Deserialize)]
pub struct ReadResourceParams {
    pub uri: String,
}

/// Payload of a resource read: UTF-8 text or base64-encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceBody {
    Text(String),
    Blob(String),
}

/// One entry of a resources/read result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: String,
    #[serde(flatten)]
    pub body: ResourceBody,
}

/// MCP resources/read result.
#[derive(Debug, Serialize)]
pub struct ReadResourceResult {
    pub contents: Vec<ResourceContent>,
}

/// MCP tool definition for tools/list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// MCP tools/list result.
#[derive(Debug, Serialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDefinition>,
}

/// MCP tools/call params, before the arguments are decoded per tool.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// MCP content item in tools/call response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// MCP tools/call result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ContentItem>,
    pub is_error: bool,
}

impl ToolCallResult {
    /// Single text item, success.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem {
                content_type: "text".to_owned(),
                text: text.into(),
            }],
            is_error: false,
        }
    }

    /// Single text item flagged as a tool-level error.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }
}

// ---------------------------------------------------------------------------
// Typed requests and the method table
// ---------------------------------------------------------------------------

/// A decoded inbound request.
#[derive(Debug)]
pub enum Request {
    Initialize(InitializeParams),
    Initialized,
    ListResources,
    ReadResource(ReadResourceParams),
    ListTools,
    CallTool(ToolCall),
}

/// Decodes the `params` of one method into a [`Request`].
pub type Decoder = fn(serde_json::Value) -> Result<Request, serde_json::Error>;

/// One row of the routing table.
pub struct MethodSpec {
    pub name: &'static str,
    /// Notifications never get a reply, whatever the envelope carries.
    pub notification: bool,
    pub decode: Decoder,
}

/// Every method the server understands.
pub const METHODS: &[MethodSpec] = &[
    MethodSpec {
        name: "initialize",
        notification: false,
        decode: |p| serde_json::from_value(p).map(Request::Initialize),
    },
    MethodSpec {
        name: "notifications/initialized",
        notification: true,
        decode: |_| Ok(Request::Initialized),
    },
    MethodSpec {
        name: "resources/list",
        notification: false,
        decode: |_| Ok(Request::ListResources),
    },
    MethodSpec {
        name: "resources/read",
        notification: false,
        decode: |p| serde_json::from_value(p).map(Request::ReadResource),
    },
    MethodSpec {
        name: "tools/list",
        notification: false,
        decode: |_| Ok(Request::ListTools),
    },
    MethodSpec {
        name: "tools/call",
        notification: false,
        decode: |p| {
            let params: ToolCallParams = serde_json::from_value(p)?;
            ToolCall::decode(&params.name, params.arguments).map(Request::CallTool)
        },
    },
];

/// Look up a method in [`METHODS`].
pub fn lookup(method: &str) -> Option<&'static MethodSpec> {
    METHODS.iter().find(|m| m.name == method)
}
