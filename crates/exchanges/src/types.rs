//! Order vocabulary shared by requests and responses
//!
//! Every enum serializes to the exchange's uppercase wire string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// BUY <-> SELL
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Child order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChildOrderType {
    Market,
    Limit,
}

impl fmt::Display for ChildOrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildOrderType::Market => write!(f, "MARKET"),
            ChildOrderType::Limit => write!(f, "LIMIT"),
        }
    }
}

/// Execution condition of one parent-order leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionType {
    Limit,
    Market,
    Stop,
    StopLimit,
    Trail,
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionType::Limit => write!(f, "LIMIT"),
            ConditionType::Market => write!(f, "MARKET"),
            ConditionType::Stop => write!(f, "STOP"),
            ConditionType::StopLimit => write!(f, "STOP_LIMIT"),
            ConditionType::Trail => write!(f, "TRAIL"),
        }
    }
}

/// Entry leg condition of an IFDOCO order: priced (LIMIT) or triggered (STOP)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryCondition {
    Limit,
    Stop,
}

impl From<EntryCondition> for ConditionType {
    fn from(entry: EntryCondition) -> Self {
        match entry {
            EntryCondition::Limit => ConditionType::Limit,
            EntryCondition::Stop => ConditionType::Stop,
        }
    }
}

/// Parent order method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderMethod {
    Simple,
    Ifd,
    Oco,
    Ifdoco,
}

impl fmt::Display for OrderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderMethod::Simple => write!(f, "SIMPLE"),
            OrderMethod::Ifd => write!(f, "IFD"),
            OrderMethod::Oco => write!(f, "OCO"),
            OrderMethod::Ifdoco => write!(f, "IFDOCO"),
        }
    }
}

/// Time in force
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    #[default]
    #[serde(rename = "GTC")]
    GoodTillCanceled,
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
    #[serde(rename = "FOK")]
    FillOrKill,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInForce::GoodTillCanceled => write!(f, "GTC"),
            TimeInForce::ImmediateOrCancel => write!(f, "IOC"),
            TimeInForce::FillOrKill => write!(f, "FOK"),
        }
    }
}

/// Exchange-managed order lifecycle state (observed only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderState {
    Active,
    Completed,
    Canceled,
    Expired,
    Rejected,
    #[default]
    #[serde(other)]
    Unknown,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Active => "ACTIVE",
            OrderState::Completed => "COMPLETED",
            OrderState::Canceled => "CANCELED",
            OrderState::Expired => "EXPIRED",
            OrderState::Rejected => "REJECTED",
            OrderState::Unknown => "UNKNOWN",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderState::Active | OrderState::Unknown)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
