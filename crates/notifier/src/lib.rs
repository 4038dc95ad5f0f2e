//! # flyer notifier
//!
//! Watches the account's bitFlyer executions and forwards every new fill to
//! a LINE chat, or to the log in dry-run mode.

pub mod config;
pub mod notifier;
pub mod sink;

pub use config::{ConfigError, LineConfig, NotifierConfig};
pub use notifier::{format_execution, ExecutionNotifier};
pub use sink::{LinePushSink, LogSink, MessageSink};
