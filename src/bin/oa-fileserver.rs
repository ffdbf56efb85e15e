//! oa-fileserver -- standalone read-only MCP file server.
//!
//! Usage: oa-fileserver [ROOT]

use std::path::PathBuf;

use clap::Parser;

use oa_fileserver::server::ServerConfig;
use oa_fileserver::util::framing::DEFAULT_MAX_LINE_BYTES;

/// Serve a directory tree to an MCP client over stdio.
#[derive(Parser)]
#[command(name = "oa-fileserver")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory to expose. Nothing outside it is reachable.
    #[arg(env = "OA_FILESERVER_ROOT", default_value = ".")]
    root: PathBuf,

    /// Maximum size of one inbound JSON-RPC line, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_BYTES)]
    max_line_bytes: usize,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing to stderr so it does not interfere with MCP stdio.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ServerConfig {
        root: cli.root,
        max_line_bytes: cli.max_line_bytes,
    };

    oa_fileserver::run_mcp_server(&config)
}
