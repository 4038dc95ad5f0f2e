//! bitFlyer timestamp codec
//!
//! The exchange reports times as `YYYY-MM-DDTHH:MM:SS[.fff]` with no zone
//! designator. Values are taken as UTC without conversion.

use crate::errors::{ExchangeError, Result};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A timestamp in the exchange's truncated ISO-8601 form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExchangeTime(NaiveDateTime);

impl ExchangeTime {
    /// Parse the wire form. Surrounding JSON quotes are stripped first.
    pub fn parse(raw: &str) -> Result<Self> {
        let s = raw.trim_matches('"');
        NaiveDateTime::parse_from_str(s, LAYOUT)
            .map(Self)
            .map_err(|e| ExchangeError::Parse(format!("{s:?}: {e}")))
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.and_utc()
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.to_utc().timestamp_millis()
    }

    pub fn subsec_millis(&self) -> u32 {
        self.to_utc().timestamp_subsec_millis()
    }
}

impl FromStr for ExchangeTime {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<NaiveDateTime> for ExchangeTime {
    fn from(dt: NaiveDateTime) -> Self {
        Self(dt)
    }
}

impl fmt::Display for ExchangeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

impl<'de> Deserialize<'de> for ExchangeTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ExchangeTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
