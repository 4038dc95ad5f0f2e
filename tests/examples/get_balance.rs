//! Account balances

use flyer_core::prelude::*;
use flyer_exchanges::bitflyer::{BitflyerConfig, BitflyerRestClient};
use tracing::info;

#[monoio::main(timer_enabled = true)]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let client = BitflyerRestClient::new(BitflyerConfig::new().with_env_credentials()?)?;

    for balance in client.get_balance().await? {
        info!("💰 {:<5} amount {:>16.8} available {:>16.8}", balance.currency_code, balance.amount, balance.available);
    }

    Ok(())
}
