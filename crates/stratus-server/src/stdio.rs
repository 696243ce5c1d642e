//! Stdio transport: newline-delimited JSON-RPC on stdin/stdout.
//!
//! Stdout carries only protocol frames; all logging goes to stderr.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::jsonrpc::{JsonRpcResponse, PARSE_ERROR};
use crate::service::McpService;

/// Serve until stdin reaches EOF.
pub async fn run(service: Arc<McpService>) -> std::io::Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str(&line) {
            Ok(request) => service.handle(request).await,
            Err(e) => {
                tracing::warn!("Unparseable request line: {e}");
                Some(JsonRpcResponse::error(
                    serde_json::Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ))
            }
        };

        if let Some(response) = response {
            let mut frame = serde_json::to_string(&response)?;
            frame.push('\n');
            stdout.write_all(frame.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    tracing::info!("stdin closed; stdio transport shutting down");
    Ok(())
}
