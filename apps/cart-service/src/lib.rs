//! # iLaCart Service Library
//!
//! Hosts a shopper's cart session and answers commands over JSON lines.
//!
//! ## Module Organization
//! ```text
//! cart_service_lib/
//! ├── lib.rs          ◄─── You are here (startup & command loop)
//! ├── state/
//! │   ├── config.rs   ◄─── ServiceConfig from ILACART_* variables
//! │   └── cart.rs     ◄─── CartState (Arc<Mutex<CartManager>>)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Invocation + dispatch table
//! │   └── cart.rs     ◄─── get_cart, add_to_cart, update_cart_row, ...
//! ├── listener.rs     ◄─── Cart events into tracing
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stdin (one invocation per line)                                        │
//! │    {"command":"add_to_cart","args":{"payload":{...}}}                   │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                    commands::invoke(&state, ..)                         │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  stdout (one reply per line)                                            │
//! │    {"ok":true,"data":{...}}                                             │
//! │    {"ok":false,"error":{"code":"NOT_FOUND","message":"..."}}            │
//! │                                                                         │
//! │  Logs go to stderr so they never mix with replies.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod listener;
pub mod state;

use serde::Serialize;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use commands::Invocation;
use error::ApiError;
use state::{CartState, ServiceConfig};

/// One line written back per invocation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl From<Result<Value, ApiError>> for Reply {
    fn from(result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(data) => Reply {
                ok: true,
                data: Some(data),
                error: None,
            },
            Err(error) => Reply {
                ok: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

/// Runs the service.
///
/// ## Startup Sequence
/// 1. Initialize tracing (stderr, `RUST_LOG` respected)
/// 2. Load `ServiceConfig` from the environment
/// 3. Open the session store and build `CartState`
/// 4. Answer invocations from stdin until EOF
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("Starting iLaCart service");

    let config = ServiceConfig::from_env();
    let state = CartState::from_config(&config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(&state, stdin.lock(), stdout.lock())?;

    info!("Input closed, shutting down");
    Ok(())
}

/// Reads invocations line by line and writes one reply per line.
///
/// Blank lines are skipped. A line that isn't an invocation gets a
/// validation error reply; the loop keeps going.
pub fn serve<R: BufRead, W: Write>(state: &CartState, input: R, mut output: W) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let result = match serde_json::from_str::<Invocation>(&line) {
            Ok(invocation) => commands::invoke(state, &invocation),
            Err(e) => {
                warn!("Malformed invocation: {}", e);
                Err(ApiError::validation(format!("Malformed invocation: {}", e)))
            }
        };

        let reply = serde_json::to_string(&Reply::from(result))?;
        writeln!(output, "{}", reply)?;
        output.flush()?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,ilacart_core=debug,ilacart_store=debug,cart_service_lib=debug")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replies(state: &CartState, input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        serve(state, input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_serve_answers_each_line() {
        let state = CartState::in_memory();
        let input = concat!(
            r#"{"command":"add_to_cart","args":{"payload":{"id":"A","name":"Mug","quantity":2,"price":"1.25"}}}"#,
            "\n\n",
            r#"{"command":"cart_quantity"}"#,
            "\n",
        );

        let out = replies(&state, input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["ok"], true);
        assert_eq!(out[0]["data"]["cart"]["totals"]["total"], 250);
        assert_eq!(out[1]["data"], 2);
        assert!(out[1].get("error").is_none());
    }

    #[test]
    fn test_serve_reports_errors_and_continues() {
        let state = CartState::in_memory();
        let input = "not json\n{\"command\":\"nope\"}\n{\"command\":\"get_cart\"}\n";

        let out = replies(&state, input);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0]["ok"], false);
        assert_eq!(out[0]["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(out[1]["error"]["code"], "NOT_FOUND");
        assert_eq!(out[2]["ok"], true);
    }
}
