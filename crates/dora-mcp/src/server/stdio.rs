//! Stdio transport for MCP protocol.
//!
//! Handles line-delimited JSON-RPC 2.0 over stdin/stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::rpc::{Dispatcher, JsonRpcResponse, codes};

/// Handle MCP protocol over the process's stdin/stdout.
pub async fn run_stdio(dispatcher: &Dispatcher) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();

    tracing::info!("MCP stdio server ready, waiting for requests...");
    serve_lines(dispatcher, reader, writer).await
}

/// Serve requests from any line reader until EOF.
///
/// Each non-empty line is one JSON-RPC message; each response is written as
/// one line. Notifications produce no output.
pub async fn serve_lines<R, W>(dispatcher: &Dispatcher, mut reader: R, mut writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let bytes_read = reader.read_until(b'\n', &mut buf).await?;

        if bytes_read == 0 {
            // EOF
            tracing::info!("Stdin closed, shutting down");
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => match serde_json::from_str::<serde_json::Value>(line.trim()) {
                Ok(value) => dispatcher.handle_value(value).await,
                Err(e) => Some(parse_error(&e)),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Discarding non-UTF-8 input line");
                Some(parse_error(&e))
            }
        };

        if let Some(response) = response {
            let response_json = serde_json::to_string(&response)?;
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    Ok(())
}

fn parse_error(err: &dyn std::fmt::Display) -> JsonRpcResponse {
    JsonRpcResponse::error(None, codes::PARSE_ERROR, format!("Parse error: {err}"))
}
