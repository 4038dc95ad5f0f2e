//! Message sinks: where formatted executions end up

use crate::config::LineConfig;

use async_trait::async_trait;
use flyer_exchanges::http::{HttpMethod, HttpRequest, MonoioHttpsClient};
use flyer_exchanges::{ExchangeError, Result, Transport};
use serde_json::json;
use tracing::{debug, info};

pub const LINE_PUSH_URL: &str = "https://api.line.me/v2/bot/message/push";

/// Delivers one text message. No retries; the caller logs failures.
#[async_trait(?Send)]
pub trait MessageSink {
    async fn push(&self, text: &str) -> Result<()>;
}

/// Push messages to one LINE user through the Messaging API
pub struct LinePushSink<T: Transport = MonoioHttpsClient> {
    transport: T,
    config: LineConfig,
}

impl LinePushSink<MonoioHttpsClient> {
    pub fn new(config: LineConfig) -> Result<Self> {
        Ok(Self::with_transport(config, MonoioHttpsClient::new()?))
    }
}

impl<T: Transport> LinePushSink<T> {
    pub fn with_transport(config: LineConfig, transport: T) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn build_request(&self, text: &str) -> HttpRequest {
        let body = json!({
            "to": self.config.user_id,
            "messages": [{ "type": "text", "text": text }],
        });

        HttpRequest::new(HttpMethod::Post, LINE_PUSH_URL)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.channel_token.as_str()))
            .body(body.to_string())
    }
}

#[async_trait(?Send)]
impl<T: Transport> MessageSink for LinePushSink<T> {
    async fn push(&self, text: &str) -> Result<()> {
        let response = self.transport.send(self.build_request(text)).await?;
        if !response.is_success() {
            return Err(ExchangeError::Api {
                status: response.status,
                body: response.text(),
            });
        }
        debug!("💬 pushed {} bytes to LINE user {}", text.len(), self.config.user_id);
        Ok(())
    }
}

/// Dry-run sink, writes each message to the log
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait(?Send)]
impl MessageSink for LogSink {
    async fn push(&self, text: &str) -> Result<()> {
        info!("💬 {}", text.replace('\n', " | "));
        Ok(())
    }
}
