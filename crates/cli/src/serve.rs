//! Daemon mode – minimal JSON-RPC-ish protocol over Unix socket.
//!
//! One request per line, one response per line. Each connection gets its
//! own calculator, so state carries across requests on the same
//! connection only.

use calc_engine::platform::HeadlessShell;
use calc_engine::types::*;
use calc_engine::{AppContext, CalculatorSettings, CommandRegistry};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

pub async fn run_daemon(
    socket_path: PathBuf,
    settings: CalculatorSettings,
    registry: CommandRegistry,
) {
    // Remove stale socket if it exists
    let _ = std::fs::remove_file(&socket_path);

    let listener = match UnixListener::bind(&socket_path) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error: cannot bind socket {}: {}", socket_path.display(), e);
            std::process::exit(2);
        }
    };

    tracing::info!(socket = %socket_path.display(), "calcctl daemon listening");

    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let mut ctx = AppContext::new(settings.clone(), Box::new(HeadlessShell));
                let (reader, mut writer) = stream.into_split();
                let mut lines = BufReader::new(reader).lines();

                while let Ok(Some(line)) = lines.next_line().await {
                    let response = handle_request(&line, &mut ctx, &registry);
                    let mut resp_json =
                        serde_json::to_string(&response).unwrap_or_else(|_| "{}".into());
                    resp_json.push('\n');
                    if writer.write_all(resp_json.as_bytes()).await.is_err() {
                        break;
                    }
                }
                tracing::debug!("connection closed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept error");
            }
        }
    }
}

fn handle_request(line: &str, ctx: &mut AppContext, registry: &CommandRegistry) -> DaemonResponse {
    let req: DaemonRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            return DaemonResponse {
                id: "unknown".into(),
                result: None,
                error: Some(ErrorInfo {
                    code: ErrorCode::InvalidInput,
                    message: format!("invalid JSON request: {}", e),
                    details: serde_json::Value::Null,
                }),
            };
        }
    };

    let result = match req.method.as_str() {
        "call" => {
            let cmd_name = req.params.get("cmd").and_then(|v| v.as_str()).unwrap_or("");
            let args = req
                .params
                .get("args")
                .cloned()
                .unwrap_or(serde_json::Value::Object(Default::default()));
            registry.execute(cmd_name, args, ctx)
        }
        "keys" => {
            let sequence = req
                .params
                .get("sequence")
                .cloned()
                .unwrap_or(serde_json::Value::Null);
            registry.execute("keys", serde_json::json!({ "sequence": sequence }), ctx)
        }
        "state" => registry.execute("state", serde_json::Value::Null, ctx),
        other => {
            return DaemonResponse {
                id: req.id,
                result: None,
                error: Some(ErrorInfo {
                    code: ErrorCode::InvalidInput,
                    message: format!("unknown method: {}", other),
                    details: serde_json::Value::Null,
                }),
            };
        }
    };

    DaemonResponse {
        id: req.id,
        result: Some(result),
        error: None,
    }
}
