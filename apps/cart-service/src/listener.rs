//! Logs every cart event.

use tracing::debug;

use ilacart_core::{CartEvent, CartListener};

/// Forwards cart events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl CartListener for TracingListener {
    fn on_event(&self, event: &CartEvent) {
        debug!(
            event = event.name(),
            instance = event.instance(),
            row_id = event.row_id().map(|id| id.as_str()).unwrap_or("-"),
            "Cart event"
        );
    }
}
