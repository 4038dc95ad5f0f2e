//! Logging setup
//!
//! Installs a single `tracing` subscriber for every flyer binary. The filter
//! comes from `RUST_LOG` and falls back to `info`.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// Initialize the global subscriber. Safe to call more than once.
pub fn init_logging() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info"))
            )
            .with_target(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .finish();

        // A host process (or test harness) may already own the global slot.
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!("tracing subscriber installed");
        }
    });
}

/// Log an order lifecycle event
#[macro_export]
macro_rules! log_order {
    ($action:expr, $acceptance_id:expr, $product:expr) => {
        tracing::info!("📋 ORDER {}: {} ({})", $action, $acceptance_id, $product);
    };
}

/// Log a failed operation without aborting the caller
#[macro_export]
macro_rules! log_error {
    ($operation:expr, $error:expr) => {
        tracing::error!("❌ {} failed: {}", $operation, $error);
    };
}
