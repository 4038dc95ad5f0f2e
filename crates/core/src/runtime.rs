//! monoio runtime bootstrap
//!
//! Every flyer binary runs its exchange calls on one single-threaded monoio
//! runtime. The timer driver is always enabled: request deadlines, retry
//! backoff and the notifier's poll interval all depend on it.

use monoio::{FusionDriver, RuntimeBuilder};
use tracing::info;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Name used in startup/shutdown logs
    pub name: String,
    /// io_uring submission queue size, `None` keeps the monoio default
    pub uring_entries: Option<u32>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            name: "flyer-main".to_string(),
            uring_entries: None,
        }
    }
}

/// Single-threaded runtime wrapper
pub struct FlyerRuntime {
    config: RuntimeConfig,
}

impl FlyerRuntime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Build the runtime and drive `f` to completion
    pub fn start<F, Fut>(self, f: F) -> std::io::Result<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future,
    {
        let mut builder = RuntimeBuilder::<FusionDriver>::new();
        if let Some(entries) = self.config.uring_entries {
            builder = builder.with_entries(entries);
        }
        let mut runtime = builder.enable_timer().build()?;

        info!("▶️  Starting {}", self.config.name);
        let output = runtime.block_on(f());
        info!("⏹️  {} stopped", self.config.name);
        Ok(output)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl Default for FlyerRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a future on a fresh default runtime
pub fn run<F, Fut>(f: F) -> std::io::Result<Fut::Output>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    FlyerRuntime::new().start(f)
}
