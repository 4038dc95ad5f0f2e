//! Parent order detail and its current state
//!
//! Usage: `cargo run --example get_parent_order <parent_order_acceptance_id>`

use flyer_core::prelude::*;
use flyer_exchanges::bitflyer::{BitflyerConfig, BitflyerRestClient};
use flyer_exchanges::ExchangeError;
use tracing::{info, warn};

#[monoio::main(timer_enabled = true)]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let Some(acceptance_id) = std::env::args().nth(1) else {
        anyhow::bail!("usage: get_parent_order <parent_order_acceptance_id>");
    };

    let client = BitflyerRestClient::new(BitflyerConfig::new().with_env_credentials()?)?;

    let detail = client.get_parent_order(&acceptance_id).await?;
    info!(
        "📦 {} method {:?}, expires in {} min",
        detail.parent_order_id, detail.order_method, detail.minute_to_expire
    );
    for (i, leg) in detail.parameters.iter().enumerate() {
        info!(
            "   leg {}: {} {} {:.8} price {:?} trigger {:?}",
            i + 1,
            leg.condition_type,
            leg.side,
            leg.size,
            leg.price,
            leg.trigger_price
        );
    }

    let timer = PerfTimer::start("find_parent_order_state");
    match client.find_parent_order_state(&acceptance_id).await {
        Ok(state) => info!("📍 state {} ({}ms)", state, timer.elapsed_millis()),
        Err(ExchangeError::NotFound { .. }) => warn!("⚠️  not in the last 1500 parent orders"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
