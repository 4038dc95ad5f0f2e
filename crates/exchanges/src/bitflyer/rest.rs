//! bitFlyer REST API client
//!
//! Every endpoint goes through one pipeline:
//! build query/body -> sign (private only) -> transport -> status check -> decode.
//!
//! The client is scoped to one product code for its whole lifetime and holds
//! no mutable state, so a shared reference can serve any number of
//! concurrent calls on the same runtime.

use crate::bitflyer::auth::{Credentials, RequestSigner, ENV_API_KEY, ENV_API_SECRET};
use crate::bitflyer::pagination::Pagination;
use crate::bitflyer::types::*;
use crate::errors::{ExchangeError, Result};
use crate::http::{HttpMethod, HttpRequest, MonoioHttpsClient};
use crate::traits::Transport;
use crate::types::{ChildOrderType, EntryCondition, OrderState, Side};
use flyer_core::{unix_seconds, PerfTimer};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const BITFLYER_API_URL: &str = "https://api.bitflyer.com";
pub const DEFAULT_PRODUCT_CODE: &str = "FX_BTC_JPY";

const CONTENT_TYPE_JSON: &str = "application/json";

/// What to do with a 2xx body that does not match the expected shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Log at warn and hand back the zero value
    #[default]
    Lenient,
    /// Fail the call with `ExchangeError::Decode`
    Strict,
}

/// bitFlyer client configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BitflyerConfig {
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    pub base_url: String,
    pub product_code: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub decode_policy: DecodePolicy,
}

impl Default for BitflyerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: BITFLYER_API_URL.to_string(),
            product_code: DEFAULT_PRODUCT_CODE.to_string(),
            timeout_ms: 10_000,
            max_retries: 0,
            retry_backoff_ms: 500,
            decode_policy: DecodePolicy::Lenient,
        }
    }
}

impl fmt::Debug for BitflyerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key: String = self.api_key.chars().take(4).collect();
        f.debug_struct("BitflyerConfig")
            .field("api_key", &format!("{key}…"))
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("product_code", &self.product_code)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("decode_policy", &self.decode_policy)
            .finish()
    }
}

impl BitflyerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self.api_secret = api_secret.into();
        self
    }

    /// Read `BITFLYER_API_KEY` / `BITFLYER_API_SECRET` from the environment
    pub fn with_env_credentials(self) -> Result<Self> {
        self.with_credentials_from(|name| std::env::var(name).ok())
    }

    /// Same as `with_env_credentials` with a custom variable lookup
    pub fn with_credentials_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY).ok_or_else(|| ExchangeError::MissingCredentials(ENV_API_KEY.to_string()))?;
        let api_secret =
            lookup(ENV_API_SECRET).ok_or_else(|| ExchangeError::MissingCredentials(ENV_API_SECRET.to_string()))?;

        self.api_key = api_key;
        self.api_secret = api_secret;
        Ok(self)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_product_code(mut self, product_code: impl Into<String>) -> Self {
        self.product_code = product_code.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Retry transport failures up to `max_retries` extra times
    pub fn with_retries(mut self, max_retries: u32, backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff_ms = backoff_ms;
        self
    }

    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    /// Credentials, when both halves are configured
    pub fn credentials(&self) -> Option<Credentials> {
        let creds = Credentials::new(self.api_key.clone(), self.api_secret.clone());
        creds.is_valid().then_some(creds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() != self.api_secret.is_empty() {
            return Err(ExchangeError::InvalidCredentials);
        }
        let url = Url::parse(&self.base_url)?;
        if url.host_str().is_none() {
            return Err(ExchangeError::InvalidUrl(format!("no host in {}", self.base_url)));
        }
        if self.product_code.trim().is_empty() {
            return Err(ExchangeError::Configuration("product_code must not be empty".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ExchangeError::Configuration("timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Sorted `key=value` pairs joined by `&`, values percent-encoded
pub fn build_query(params: &[(&str, String)]) -> String {
    let mut pairs: Vec<&(&str, String)> = params.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// bitFlyer REST client over any `Transport`
pub struct BitflyerRestClient<T: Transport = MonoioHttpsClient> {
    config: BitflyerConfig,
    base_url: String,
    signer: Option<RequestSigner>,
    transport: T,
}

impl BitflyerRestClient<MonoioHttpsClient> {
    /// Client over the built-in HTTPS transport
    pub fn new(config: BitflyerConfig) -> Result<Self> {
        let transport = MonoioHttpsClient::with_timeout(Duration::from_millis(config.timeout_ms))?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> BitflyerRestClient<T> {
    pub fn with_transport(config: BitflyerConfig, transport: T) -> Result<Self> {
        config.validate()?;

        let signer = config.credentials().map(RequestSigner::new).transpose()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        info!("🔗 bitFlyer REST client created");
        info!("   Base URL: {}", base_url);
        info!("   Product: {}", config.product_code);
        match &signer {
            Some(signer) => info!("   API key: {}", signer.credentials().redacted_key()),
            None => info!("   No credentials, public endpoints only"),
        }

        Ok(Self {
            config,
            base_url,
            signer,
            transport,
        })
    }

    pub fn config(&self) -> &BitflyerConfig {
        &self.config
    }

    pub fn product_code(&self) -> &str {
        &self.config.product_code
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.is_some()
    }

    // ------------------------------------------------------------------------
    // Public endpoints
    // ------------------------------------------------------------------------

    /// Order book for the client's product
    pub async fn get_board(&self) -> Result<Board> {
        let query = vec![self.product_param()];
        self.get("/v1/getboard", false, &query).await
    }

    // ------------------------------------------------------------------------
    // Account
    // ------------------------------------------------------------------------

    /// Asset balances, one row per currency
    pub async fn get_balance(&self) -> Result<Vec<Balance>> {
        self.get("/v1/me/getbalance", true, &[]).await
    }

    // ------------------------------------------------------------------------
    // Executions
    // ------------------------------------------------------------------------

    /// Own executions, newest first
    pub async fn get_executions(&self, params: &GetExecutionsParams) -> Result<Vec<Execution>> {
        let mut query = params.query();
        query.push(self.product_param());
        self.get("/v1/me/getexecutions", true, &query).await
    }

    /// Executions of one child order, by its acceptance id
    pub async fn get_executions_by_acceptance_id(&self, acceptance_id: &str) -> Result<Vec<Execution>> {
        self.get_executions(&GetExecutionsParams::new().with_acceptance_id(acceptance_id))
            .await
    }

    // ------------------------------------------------------------------------
    // Child orders
    // ------------------------------------------------------------------------

    pub async fn get_child_orders(&self, params: &GetChildOrdersParams) -> Result<Vec<ChildOrder>> {
        let mut query = params.query();
        query.push(self.product_param());
        self.get("/v1/me/getchildorders", true, &query).await
    }

    pub async fn get_child_orders_by_child_order_id(&self, child_order_id: &str) -> Result<Vec<ChildOrder>> {
        self.get_child_orders(&GetChildOrdersParams::new().with_child_order_id(child_order_id))
            .await
    }

    /// Child orders spawned by one parent order
    pub async fn get_child_orders_by_parent_id(&self, parent_order_id: &str) -> Result<Vec<ChildOrder>> {
        self.get_child_orders(&GetChildOrdersParams::new().with_parent_order_id(parent_order_id))
            .await
    }

    /// Submit a child order. The client's product code replaces whatever the
    /// request carried.
    pub async fn send_child_order(&self, mut request: SendChildOrderRequest) -> Result<SendChildOrderResponse> {
        request.product_code = self.config.product_code.clone();
        validate_child_order(&request)?;

        let response: SendChildOrderResponse = self.post("/v1/me/sendchildorder", &request).await?;
        flyer_core::log_order!(
            format!("{} {} {}", request.child_order_type, request.side, request.size),
            response.child_order_acceptance_id,
            request.product_code
        );
        Ok(response)
    }

    pub async fn send_child_order_market(&self, side: Side, size: f64) -> Result<SendChildOrderResponse> {
        self.send_child_order(SendChildOrderRequest::market(side, size)).await
    }

    pub async fn send_child_order_limit(&self, side: Side, price: f64, size: f64) -> Result<SendChildOrderResponse> {
        self.send_child_order(SendChildOrderRequest::limit(side, price, size)).await
    }

    // ------------------------------------------------------------------------
    // Parent orders
    // ------------------------------------------------------------------------

    /// Submit a parent order with the client's product code on every leg
    pub async fn send_parent_order(&self, mut request: SendParentOrderRequest) -> Result<SendParentOrderResponse> {
        for leg in &mut request.parameters {
            leg.product_code = self.config.product_code.clone();
        }
        validate_parent_order(&request)?;

        let response: SendParentOrderResponse = self.post("/v1/me/sendparentorder", &request).await?;
        flyer_core::log_order!(
            format!("{} x{}", request.order_method, request.parameters.len()),
            response.parent_order_acceptance_id,
            self.config.product_code
        );
        Ok(response)
    }

    /// SIMPLE parent order with a single STOP leg
    pub async fn send_parent_order_stop(&self, side: Side, trigger_price: f64, size: f64) -> Result<SendParentOrderResponse> {
        self.send_parent_order(SendParentOrderRequest::simple(ParentOrderLeg::stop(side, trigger_price, size)))
            .await
    }

    /// Entry leg plus an opposite-side LIMIT/STOP bracket
    pub async fn send_parent_order_ifdoco(
        &self,
        entry: EntryCondition,
        side: Side,
        entry_price: f64,
        limit_price: f64,
        stop_price: f64,
        size: f64,
    ) -> Result<SendParentOrderResponse> {
        self.send_parent_order(SendParentOrderRequest::ifdoco(
            entry,
            side,
            entry_price,
            limit_price,
            stop_price,
            size,
        ))
        .await
    }

    /// Parent orders, newest first
    pub async fn get_parent_orders(&self, params: &GetParentOrdersParams) -> Result<Vec<ParentOrder>> {
        let mut query = params.query();
        query.push(self.product_param());
        self.get("/v1/me/getparentorders", true, &query).await
    }

    /// Detail of one parent order, including its legs
    pub async fn get_parent_order(&self, acceptance_id: &str) -> Result<ParentOrderDetail> {
        let query = vec![("parent_order_acceptance_id", acceptance_id.to_string())];
        self.get("/v1/me/getparentorder", true, &query).await
    }

    /// One page of parent orders older than `page.before`
    pub(crate) async fn parent_order_page(&self, page: Pagination) -> Result<Vec<ParentOrder>> {
        self.get_parent_orders(&GetParentOrdersParams::new().with_page(page)).await
    }

    /// State of the parent order with this acceptance id
    pub async fn find_parent_order_state(&self, acceptance_id: &str) -> Result<OrderState> {
        crate::bitflyer::resolver::find_parent_order_state(self, acceptance_id).await
    }

    // ------------------------------------------------------------------------
    // Request pipeline
    // ------------------------------------------------------------------------

    fn product_param(&self) -> (&'static str, String) {
        ("product_code", self.config.product_code.clone())
    }

    async fn get<R: DeserializeOwned + Default>(&self, path: &str, private: bool, query: &[(&str, String)]) -> Result<R> {
        let raw = self.execute(HttpMethod::Get, path, private, query, None).await?;
        self.decode(path, &raw)
    }

    async fn post<B: Serialize, R: DeserializeOwned + Default>(&self, path: &str, body: &B) -> Result<R> {
        let body = serde_json::to_string(body)?;
        let raw = self.execute(HttpMethod::Post, path, true, &[], Some(&body)).await?;
        self.decode(path, &raw)
    }

    /// Send one request and return the raw 2xx body.
    ///
    /// Retryable failures are retried up to `max_retries` times with a
    /// doubling backoff; every attempt is signed with a fresh timestamp.
    pub async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        private: bool,
        query: &[(&str, String)],
        body: Option<&str>,
    ) -> Result<Vec<u8>> {
        if private && self.signer.is_none() {
            return Err(ExchangeError::MissingCredentials(format!(
                "{ENV_API_KEY}/{ENV_API_SECRET} required for {path}"
            )));
        }

        let query_string = build_query(query);
        let path_and_query = if query_string.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{query_string}")
        };

        let mut attempt: u32 = 0;
        loop {
            match self.send_once(method, &path_and_query, private, body).await {
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self
                        .config
                        .retry_backoff_ms
                        .saturating_mul(1u64 << attempt.min(16));
                    warn!(
                        "🔁 {} {} failed ({}), retry {}/{} in {}ms",
                        method,
                        path_and_query,
                        err,
                        attempt + 1,
                        self.config.max_retries,
                        delay
                    );
                    monoio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send_once(&self, method: HttpMethod, path_and_query: &str, private: bool, body: Option<&str>) -> Result<Vec<u8>> {
        let _timer = PerfTimer::start(format!("bitflyer {method} {path_and_query}"));

        let mut request = HttpRequest::new(method, format!("{}{}", self.base_url, path_and_query))
            .header("Content-Type", CONTENT_TYPE_JSON);

        if private {
            let signer = self
                .signer
                .as_ref()
                .ok_or_else(|| ExchangeError::MissingCredentials(path_and_query.to_string()))?;
            let auth = signer.auth_headers(unix_seconds(), method.as_str(), path_and_query, body.unwrap_or(""))?;
            for (name, value) in auth.into_pairs() {
                request = request.header(name, value);
            }
            debug!(
                "📡 {} {} (private, key {})",
                method,
                path_and_query,
                signer.credentials().redacted_key()
            );
        } else {
            debug!("📡 {} {}", method, path_and_query);
        }

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = self.transport.send(request).await?;
        debug!("📥 {} {} -> {} ({} bytes)", method, path_and_query, response.status, response.body.len());

        if !response.is_success() {
            return Err(ExchangeError::Api {
                status: response.status,
                body: response.text(),
            });
        }

        Ok(response.body)
    }

    fn decode<R: DeserializeOwned + Default>(&self, path: &str, raw: &[u8]) -> Result<R> {
        match serde_json::from_slice(raw) {
            Ok(value) => Ok(value),
            Err(err) => match self.config.decode_policy {
                DecodePolicy::Strict => Err(ExchangeError::Decode(format!("{path}: {err}"))),
                DecodePolicy::Lenient => {
                    warn!("⚠️  {} returned an unexpected body, using empty result: {}", path, err);
                    Ok(R::default())
                }
            },
        }
    }
}

fn validate_size(size: f64) -> Result<()> {
    if !(size.is_finite() && size > 0.0) {
        return Err(ExchangeError::InvalidOrder(format!("size must be positive, got {size}")));
    }
    Ok(())
}

fn validate_child_order(request: &SendChildOrderRequest) -> Result<()> {
    validate_size(request.size)?;
    match (request.child_order_type, request.price) {
        (ChildOrderType::Limit, None) => Err(ExchangeError::InvalidOrder("LIMIT order needs a price".to_string())),
        (ChildOrderType::Market, Some(_)) => {
            Err(ExchangeError::InvalidOrder("MARKET order must not carry a price".to_string()))
        }
        _ => Ok(()),
    }
}

fn validate_parent_order(request: &SendParentOrderRequest) -> Result<()> {
    if request.parameters.is_empty() {
        return Err(ExchangeError::InvalidOrder("parent order has no legs".to_string()));
    }
    request.parameters.iter().try_for_each(|leg| validate_size(leg.size))
}
