//! # iLaCart Service Entry Point
//!
//! ```text
//! ILACART_STORE=file ILACART_SESSION_ID=sess_1 cart-service < commands.jsonl
//! ```
//!
//! Setup lives in lib.rs so it can be tested.

use std::process::ExitCode;

fn main() -> ExitCode {
    match cart_service_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("cart-service: {}", e);
            ExitCode::FAILURE
        }
    }
}
