//! # flyer core
//!
//! Shared runtime plumbing for the flyer exchange client and its daemons.
//!
//! ## Contents
//!
//! 1. **monoio runtime** - single-threaded async with the timer driver enabled
//! 2. **Logging** - one-shot `tracing` subscriber setup driven by `RUST_LOG`
//! 3. **Timing** - wall-clock helpers and a latency timer for request logging

pub mod runtime;
pub mod timing;
pub mod logging;

pub use runtime::{FlyerRuntime, RuntimeConfig, run};
pub use timing::{nanos, unix_seconds, PerfTimer};
pub use logging::init_logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::runtime::{FlyerRuntime, RuntimeConfig, run};
    pub use crate::timing::{nanos, unix_seconds, PerfTimer};
    pub use crate::logging::init_logging;

    pub use monoio;
}
