//! Integration tests for the flyer workspace
//!
//! - `client_tests` - rstest scenarios against `MockTransport`
//! - `property_tests` - proptest properties of the signing and cursor layers
//! - `live_tests` - ignored by default, hit the real public API

#[cfg(test)]
mod client_tests;
#[cfg(test)]
mod live_tests;
