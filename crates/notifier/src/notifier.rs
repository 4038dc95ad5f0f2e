//! Execution polling loop
//!
//! Keeps an `after` cursor on the newest execution id already seen. Each poll
//! asks for executions newer than the cursor, forwards them oldest first and
//! moves the cursor to the newest id of the batch. The cursor moves even when
//! a message could not be delivered, so a failed push is never resent.

use crate::sink::MessageSink;

use flyer_exchanges::bitflyer::{BitflyerRestClient, Execution, GetExecutionsParams, Pagination};
use flyer_exchanges::{Result, Transport};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Text pushed for one execution
pub fn format_execution(execution: &Execution) -> String {
    format!(
        "Date: {}\nPrice: {:.6} ({})\nSize: {:.6}",
        execution.exec_date, execution.price, execution.side, execution.size
    )
}

pub struct ExecutionNotifier<T: Transport, S: MessageSink> {
    client: BitflyerRestClient<T>,
    sink: S,
    poll_interval: Duration,
    after: Option<u64>,
}

impl<T: Transport, S: MessageSink> ExecutionNotifier<T, S> {
    pub fn new(client: BitflyerRestClient<T>, sink: S, poll_interval: Duration) -> Self {
        Self {
            client,
            sink,
            poll_interval,
            after: None,
        }
    }

    pub fn client(&self) -> &BitflyerRestClient<T> {
        &self.client
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Newest execution id already handled, once bootstrapped
    pub fn cursor(&self) -> Option<u64> {
        self.after
    }

    /// Start from the newest existing execution so history is not replayed.
    ///
    /// An empty answer leaves the notifier unbootstrapped: a lenient decode
    /// turns an unreadable body into an empty list, and starting from 0 would
    /// replay the whole history.
    pub async fn bootstrap(&mut self) -> Result<Option<u64>> {
        let params = GetExecutionsParams::new().with_page(Pagination::new().with_count(1));
        let latest = self.client.get_executions(&params).await?;

        let Some(after) = latest.first().map(|e| e.id) else {
            warn!("⚠️  no execution to start from, will retry on next poll");
            return Ok(None);
        };
        info!("📍 notifier starting after execution {}", after);
        self.after = Some(after);
        Ok(Some(after))
    }

    /// Fetch and forward everything newer than the cursor. Returns how many
    /// executions were forwarded.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let after = match self.after {
            Some(after) => after,
            None => match self.bootstrap().await? {
                Some(after) => after,
                None => return Ok(0),
            },
        };

        let params = GetExecutionsParams::new().with_page(Pagination::new().with_after(after));
        let executions = self.client.get_executions(&params).await?;
        let Some(newest) = executions.iter().map(|e| e.id).max() else {
            debug!("no executions after {}", after);
            return Ok(0);
        };

        // Exchange order is newest first
        for execution in executions.iter().rev() {
            let text = format_execution(execution);
            if let Err(e) = self.sink.push(&text).await {
                warn!("⚠️  failed to deliver execution {}: {}", execution.id, e);
            }
        }

        self.after = Some(newest);
        info!("📨 forwarded {} executions, cursor now {}", executions.len(), newest);
        Ok(executions.len())
    }

    /// Poll forever, sleeping `poll_interval` between rounds
    pub async fn run(&mut self) {
        loop {
            if let Err(e) = self.poll_once().await {
                flyer_core::log_error!("poll executions", e);
            }
            monoio::time::sleep(self.poll_interval).await;
        }
    }
}
