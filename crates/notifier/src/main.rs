use flyer_core::{init_logging, FlyerRuntime, RuntimeConfig};
use flyer_exchanges::bitflyer::BitflyerRestClient;
use flyer_notifier::{ExecutionNotifier, LinePushSink, LogSink, NotifierConfig};

use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = NotifierConfig::from_env()?;
    info!("🔔 flyer notifier, polling every {}s", config.poll_interval.as_secs());

    let runtime = FlyerRuntime::with_config(RuntimeConfig {
        name: "flyer-notifier".to_string(),
        ..Default::default()
    });

    runtime.start(|| async move {
        let client = BitflyerRestClient::new(config.exchange)?;

        match config.line {
            Some(line) => {
                let sink = LinePushSink::new(line)?;
                ExecutionNotifier::new(client, sink, config.poll_interval).run().await;
            }
            None => {
                warn!("LINE_CHANNEL_TOKEN/LINE_USERID not set, messages go to the log only");
                ExecutionNotifier::new(client, LogSink, config.poll_interval).run().await;
            }
        }
        Ok::<(), anyhow::Error>(())
    })?
}
