//! # flyer exchanges
//!
//! bitFlyer exchange client for the flyer workspace.
//!
//! ## Architecture
//!
//! - **monoio-based HTTPS transport** - single-threaded async, one TLS connection per request
//! - **Transport seam** - the client is generic over `Transport`, so tests swap in `MockTransport`
//! - **Signed request pipeline** - HMAC-SHA256 over timestamp, method, path and body
//! - **Typed wire model** - enums for sides, order types and states; acceptance ids stay strings

#[cfg(feature = "bitflyer")]
pub mod bitflyer;
pub mod errors;
pub mod http;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export main types
#[cfg(feature = "bitflyer")]
pub use bitflyer::{BitflyerConfig, BitflyerRestClient};
pub use errors::{ExchangeError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, MonoioHttpsClient};
pub use traits::Transport;
pub use types::*;

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "bitflyer")]
    pub use crate::bitflyer::*;
    pub use crate::errors::{ExchangeError, Result};
    pub use crate::http::{HttpMethod, HttpRequest, HttpResponse, MonoioHttpsClient};
    pub use crate::traits::Transport;
    pub use crate::types::*;
    pub use flyer_core::prelude::*;
}
