//! Live API checks, ignored by default
//!
//! Run with `cargo test -p flyer-tests -- --ignored`. Private checks need
//! `BITFLYER_API_KEY` / `BITFLYER_API_SECRET` in the environment or `.env`.

use flyer_exchanges::bitflyer::{BitflyerConfig, BitflyerRestClient, GetExecutionsParams, Pagination};
use rstest::*;
use serial_test::serial;
use tracing::info;

#[fixture]
fn public_client() -> BitflyerRestClient {
    flyer_core::init_logging();
    BitflyerRestClient::new(BitflyerConfig::new().with_retries(2, 500)).unwrap()
}

#[fixture]
fn private_client() -> BitflyerRestClient {
    dotenv::dotenv().ok();
    flyer_core::init_logging();

    let config = BitflyerConfig::new()
        .with_env_credentials()
        .expect("BITFLYER_API_KEY / BITFLYER_API_SECRET must be set");
    BitflyerRestClient::new(config).unwrap()
}

#[rstest]
#[monoio::test(timer_enabled = true)]
#[ignore = "hits the live bitFlyer API"]
#[serial]
async fn test_live_board(public_client: BitflyerRestClient) {
    let board = public_client.get_board().await.unwrap();
    info!("mid price {}", board.mid_price);

    assert!(board.mid_price > 0.0);
    if let (Some(bid), Some(ask)) = (board.bids.first(), board.asks.first()) {
        assert!(bid.price <= ask.price, "book is crossed: {} > {}", bid.price, ask.price);
    }
}

#[rstest]
#[monoio::test(timer_enabled = true)]
#[ignore = "needs API credentials"]
#[serial]
async fn test_live_executions_are_newest_first(private_client: BitflyerRestClient) {
    let params = GetExecutionsParams::new().with_page(Pagination::new().with_count(10));
    let executions = private_client.get_executions(&params).await.unwrap();

    assert!(executions.len() <= 10);
    assert!(executions.windows(2).all(|w| w[0].id > w[1].id));
}
