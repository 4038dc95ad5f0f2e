//! bitFlyer Lightning integration
//!
//! REST client for the bitFlyer public and private API: HMAC-signed
//! requests, cursor pagination, order submission and order-state lookup.

pub mod auth;
pub mod pagination;
pub mod resolver;
pub mod rest;
pub mod time;
pub mod types;

pub use auth::{sign, AuthHeaders, Credentials, RequestSigner};
pub use pagination::Pagination;
pub use resolver::{find_parent_order_state, WINDOWS};
pub use rest::{build_query, BitflyerConfig, BitflyerRestClient, DecodePolicy, BITFLYER_API_URL, DEFAULT_PRODUCT_CODE};
pub use time::ExchangeTime;
pub use types::*;
