//! `oa-fileserver` — read-only MCP file server over stdio.
//!
//! Exposes one directory tree to an MCP client as resources and a small set
//! of file tools, over JSON-RPC 2.0 (newline-delimited) on stdin/stdout.
//! Every path is confined to the configured root.
//!
//! # Methods
//!
//! - `initialize`, `notifications/initialized`
//! - `resources/list`, `resources/read`
//! - `tools/list`, `tools/call`
//!
//! # Tools
//!
//! - `read_file` — whole-file text read
//! - `list_directory` — non-recursive listing with file sizes
//! - `search_files` — file name search via glob patterns
//!
//! # Architecture
//!
//! ```text
//! stdin (JSON-RPC) → FrameReader → Server ──→ resources ──┐
//!                                    └──→ ToolRouter ──┴→ Sandbox
//! stdout (JSON-RPC) ← FrameWriter ←──┘
//! ```

pub mod error;
pub mod protocol;
pub mod resources;
pub mod sandbox;
pub mod server;
pub mod tools;
pub mod util;

pub use error::{FileServerError, FileServerResult};
pub use server::{Server, ServerConfig, run_mcp_server};
