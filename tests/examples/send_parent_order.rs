//! Place a SIMPLE stop or an IFDOCO bracket
//!
//! Usage:
//!   `cargo run --example send_parent_order stop <BUY|SELL> <trigger> <size>`
//!   `cargo run --example send_parent_order ifdoco <BUY|SELL> <entry> <take_profit> <stop_loss> <size>`
//!
//! This submits a real order.

use flyer_core::prelude::*;
use flyer_exchanges::bitflyer::{BitflyerConfig, BitflyerRestClient};
use flyer_exchanges::prelude::{EntryCondition, Side};
use tracing::info;

fn parse_side(raw: &str) -> anyhow::Result<Side> {
    match raw.to_uppercase().as_str() {
        "BUY" => Ok(Side::Buy),
        "SELL" => Ok(Side::Sell),
        other => anyhow::bail!("side must be BUY or SELL, got {other}"),
    }
}

#[monoio::main(timer_enabled = true)]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let client = BitflyerRestClient::new(BitflyerConfig::new().with_env_credentials()?)?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    let response = match args.as_slice() {
        [kind, side, trigger, size] if kind == "stop" => {
            let side = parse_side(side)?;
            info!("🛑 STOP {} {} triggered at {}", side, size, trigger);
            client.send_parent_order_stop(side, trigger.parse()?, size.parse()?).await?
        }
        [kind, side, entry, take_profit, stop_loss, size] if kind == "ifdoco" => {
            let side = parse_side(side)?;
            info!(
                "🎯 IFDOCO {} {} entry {} / take profit {} / stop loss {}",
                side, size, entry, take_profit, stop_loss
            );
            client
                .send_parent_order_ifdoco(
                    EntryCondition::Limit,
                    side,
                    entry.parse()?,
                    take_profit.parse()?,
                    stop_loss.parse()?,
                    size.parse()?,
                )
                .await?
        }
        _ => anyhow::bail!("usage: send_parent_order stop|ifdoco ..."),
    };

    info!("✅ accepted: {}", response.parent_order_acceptance_id);
    Ok(())
}
