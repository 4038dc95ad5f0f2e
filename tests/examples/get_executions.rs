//! Recent executions, optionally filtered by child order acceptance id
//!
//! Usage: `cargo run --example get_executions [acceptance_id]`

use flyer_core::prelude::*;
use flyer_exchanges::bitflyer::{BitflyerConfig, BitflyerRestClient, GetExecutionsParams, Pagination};
use tracing::info;

#[monoio::main(timer_enabled = true)]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let client = BitflyerRestClient::new(BitflyerConfig::new().with_env_credentials()?)?;

    let executions = match std::env::args().nth(1) {
        Some(acceptance_id) => client.get_executions_by_acceptance_id(&acceptance_id).await?,
        None => {
            let params = GetExecutionsParams::new().with_page(Pagination::new().with_count(10));
            client.get_executions(&params).await?
        }
    };

    info!("📋 {} executions", executions.len());
    for exec in &executions {
        info!(
            "   #{} {} {} {:.8} @ {:.0} ({})",
            exec.id, exec.exec_date, exec.side, exec.size, exec.price, exec.child_order_acceptance_id
        );
    }

    Ok(())
}
