//! Parent order state lookup by acceptance id
//!
//! The order history comes back newest first. The scan walks it in widening
//! pages, chaining `before = last id seen` so no order is fetched twice. It
//! stops at the first match and otherwise runs every window before giving up.
//! An empty page leaves the cursor where it was.

use crate::bitflyer::pagination::Pagination;
use crate::bitflyer::rest::BitflyerRestClient;
use crate::errors::{ExchangeError, Result};
use crate::traits::Transport;
use crate::types::OrderState;

use tracing::debug;

/// Page sizes tried in order
pub const WINDOWS: [u64; 3] = [100, 400, 1000];

pub async fn find_parent_order_state<T: Transport>(
    client: &BitflyerRestClient<T>,
    acceptance_id: &str,
) -> Result<OrderState> {
    let mut before: Option<u64> = None;

    for (round, count) in WINDOWS.into_iter().enumerate() {
        let mut page = Pagination::new().with_count(count);
        if let Some(id) = before {
            page = page.with_before(id);
        }

        let orders = client.parent_order_page(page).await?;
        debug!("🔎 window {} (count={}, before={:?}): {} orders", round + 1, count, before, orders.len());

        if let Some(order) = orders
            .iter()
            .find(|order| order.parent_order_acceptance_id == acceptance_id)
        {
            return Ok(order.parent_order_state);
        }

        if let Some(last) = orders.last() {
            before = Some(last.id);
        }
    }

    Err(ExchangeError::NotFound {
        acceptance_id: acceptance_id.to_string(),
    })
}
