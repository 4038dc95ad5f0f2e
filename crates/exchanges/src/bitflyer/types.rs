//! bitFlyer request and response shapes
//!
//! Field names are the exchange's snake_case wire names. Acceptance ids are
//! opaque strings and are never coerced to numbers.

use crate::bitflyer::pagination::Pagination;
use crate::bitflyer::time::ExchangeTime;
use crate::types::{ChildOrderType, ConditionType, EntryCondition, OrderMethod, OrderState, Side, TimeInForce};

use serde::{Deserialize, Serialize};

/// Default order lifetime in minutes (30 days)
pub const DEFAULT_MINUTE_TO_EXPIRE: u64 = 43_200;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

/// One price level of the order book
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardLevel {
    pub price: f64,
    pub size: f64,
}

/// Order book snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub mid_price: f64,
    #[serde(default)]
    pub bids: Vec<BoardLevel>,
    #[serde(default)]
    pub asks: Vec<BoardLevel>,
}

// ----------------------------------------------------------------------------
// Private API: account
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub currency_code: String,
    pub amount: f64,
    pub available: f64,
}

// ----------------------------------------------------------------------------
// Private API: executions
// ----------------------------------------------------------------------------

/// One fill of one of the account's child orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: u64,
    pub child_order_id: String,
    pub side: Side,
    pub price: f64,
    pub size: f64,
    #[serde(default)]
    pub commission: f64,
    pub exec_date: ExchangeTime,
    pub child_order_acceptance_id: String,
}

/// Filters for `/v1/me/getexecutions`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetExecutionsParams {
    pub page: Pagination,
    pub child_order_id: Option<String>,
    pub child_order_acceptance_id: Option<String>,
}

impl GetExecutionsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: Pagination) -> Self {
        self.page = page;
        self
    }

    pub fn with_child_order_id(mut self, id: impl Into<String>) -> Self {
        self.child_order_id = Some(id.into());
        self
    }

    pub fn with_acceptance_id(mut self, id: impl Into<String>) -> Self {
        self.child_order_acceptance_id = Some(id.into());
        self
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = self.page.render();
        push_opt(&mut query, "child_order_id", &self.child_order_id);
        push_opt(&mut query, "child_order_acceptance_id", &self.child_order_acceptance_id);
        query
    }
}

// ----------------------------------------------------------------------------
// Private API: child orders
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildOrder {
    pub id: u64,
    pub child_order_id: String,
    pub product_code: String,
    pub side: Side,
    pub child_order_type: ChildOrderType,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub average_price: f64,
    pub size: f64,
    pub child_order_state: OrderState,
    pub expire_date: ExchangeTime,
    pub child_order_date: ExchangeTime,
    pub child_order_acceptance_id: String,
    #[serde(default)]
    pub outstanding_size: f64,
    #[serde(default)]
    pub cancel_size: f64,
    #[serde(default)]
    pub executed_size: f64,
    #[serde(default)]
    pub total_commission: f64,
}

/// Filters for `/v1/me/getchildorders`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetChildOrdersParams {
    pub page: Pagination,
    pub child_order_state: Option<OrderState>,
    pub child_order_id: Option<String>,
    pub child_order_acceptance_id: Option<String>,
    pub parent_order_id: Option<String>,
}

impl GetChildOrdersParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: Pagination) -> Self {
        self.page = page;
        self
    }

    pub fn with_state(mut self, state: OrderState) -> Self {
        self.child_order_state = Some(state);
        self
    }

    pub fn with_child_order_id(mut self, id: impl Into<String>) -> Self {
        self.child_order_id = Some(id.into());
        self
    }

    pub fn with_acceptance_id(mut self, id: impl Into<String>) -> Self {
        self.child_order_acceptance_id = Some(id.into());
        self
    }

    pub fn with_parent_order_id(mut self, id: impl Into<String>) -> Self {
        self.parent_order_id = Some(id.into());
        self
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = self.page.render();
        if let Some(state) = self.child_order_state {
            query.push(("child_order_state", state.to_string()));
        }
        push_opt(&mut query, "child_order_id", &self.child_order_id);
        push_opt(&mut query, "child_order_acceptance_id", &self.child_order_acceptance_id);
        push_opt(&mut query, "parent_order_id", &self.parent_order_id);
        query
    }
}

/// Body of `/v1/me/sendchildorder`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendChildOrderRequest {
    pub product_code: String,
    pub child_order_type: ChildOrderType,
    pub side: Side,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub size: f64,
    pub minute_to_expire: u64,
    pub time_in_force: TimeInForce,
}

impl SendChildOrderRequest {
    /// Product code is filled in by the client at send time
    pub fn new(child_order_type: ChildOrderType, side: Side, size: f64) -> Self {
        Self {
            product_code: String::new(),
            child_order_type,
            side,
            price: None,
            size,
            minute_to_expire: DEFAULT_MINUTE_TO_EXPIRE,
            time_in_force: TimeInForce::default(),
        }
    }

    pub fn market(side: Side, size: f64) -> Self {
        Self::new(ChildOrderType::Market, side, size)
    }

    pub fn limit(side: Side, price: f64, size: f64) -> Self {
        Self {
            price: Some(price),
            ..Self::new(ChildOrderType::Limit, side, size)
        }
    }

    pub fn with_minute_to_expire(mut self, minutes: u64) -> Self {
        self.minute_to_expire = minutes;
        self
    }

    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendChildOrderResponse {
    pub child_order_acceptance_id: String,
}

// ----------------------------------------------------------------------------
// Private API: parent orders
// ----------------------------------------------------------------------------

/// One leg of a parent order, as sent and as echoed back by the detail API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentOrderLeg {
    #[serde(default)]
    pub product_code: String,
    pub condition_type: ConditionType,
    pub side: Side,
    pub size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

impl ParentOrderLeg {
    fn new(condition_type: ConditionType, side: Side, size: f64) -> Self {
        Self {
            product_code: String::new(),
            condition_type,
            side,
            size,
            price: None,
            trigger_price: None,
            offset: None,
        }
    }

    pub fn market(side: Side, size: f64) -> Self {
        Self::new(ConditionType::Market, side, size)
    }

    pub fn limit(side: Side, price: f64, size: f64) -> Self {
        Self {
            price: Some(price),
            ..Self::new(ConditionType::Limit, side, size)
        }
    }

    pub fn stop(side: Side, trigger_price: f64, size: f64) -> Self {
        Self {
            trigger_price: Some(trigger_price),
            ..Self::new(ConditionType::Stop, side, size)
        }
    }

    pub fn stop_limit(side: Side, trigger_price: f64, price: f64, size: f64) -> Self {
        Self {
            price: Some(price),
            trigger_price: Some(trigger_price),
            ..Self::new(ConditionType::StopLimit, side, size)
        }
    }

    pub fn trail(side: Side, offset: f64, size: f64) -> Self {
        Self {
            offset: Some(offset),
            ..Self::new(ConditionType::Trail, side, size)
        }
    }

    /// LIMIT entry at `price`, or STOP entry triggered at `price`
    pub fn entry(condition: EntryCondition, side: Side, price: f64, size: f64) -> Self {
        match condition {
            EntryCondition::Limit => Self::limit(side, price, size),
            EntryCondition::Stop => Self::stop(side, price, size),
        }
    }
}

/// Body of `/v1/me/sendparentorder`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendParentOrderRequest {
    pub order_method: OrderMethod,
    pub minute_to_expire: u64,
    pub time_in_force: TimeInForce,
    pub parameters: Vec<ParentOrderLeg>,
}

impl SendParentOrderRequest {
    pub fn new(order_method: OrderMethod) -> Self {
        Self {
            order_method,
            minute_to_expire: DEFAULT_MINUTE_TO_EXPIRE,
            time_in_force: TimeInForce::default(),
            parameters: Vec::new(),
        }
    }

    /// Single-leg SIMPLE order
    pub fn simple(leg: ParentOrderLeg) -> Self {
        Self::new(OrderMethod::Simple).with_leg(leg)
    }

    /// Entry leg followed by an opposite-side LIMIT take-profit and STOP loss-cut
    pub fn ifdoco(
        entry: EntryCondition,
        side: Side,
        entry_price: f64,
        limit_price: f64,
        stop_price: f64,
        size: f64,
    ) -> Self {
        let exit = side.opposite();
        Self::new(OrderMethod::Ifdoco)
            .with_leg(ParentOrderLeg::entry(entry, side, entry_price, size))
            .with_leg(ParentOrderLeg::limit(exit, limit_price, size))
            .with_leg(ParentOrderLeg::stop(exit, stop_price, size))
    }

    pub fn with_leg(mut self, leg: ParentOrderLeg) -> Self {
        self.parameters.push(leg);
        self
    }

    pub fn with_minute_to_expire(mut self, minutes: u64) -> Self {
        self.minute_to_expire = minutes;
        self
    }

    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendParentOrderResponse {
    pub parent_order_acceptance_id: String,
}

/// Row of `/v1/me/getparentorders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentOrder {
    pub id: u64,
    pub parent_order_id: String,
    pub product_code: String,
    pub side: Side,
    pub parent_order_type: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub average_price: f64,
    pub size: f64,
    pub parent_order_state: OrderState,
    pub expire_date: ExchangeTime,
    pub parent_order_date: ExchangeTime,
    pub parent_order_acceptance_id: String,
    #[serde(default)]
    pub outstanding_size: f64,
    #[serde(default)]
    pub cancel_size: f64,
    #[serde(default)]
    pub executed_size: f64,
    #[serde(default)]
    pub total_commission: f64,
}

/// Filters for `/v1/me/getparentorders`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetParentOrdersParams {
    pub page: Pagination,
    pub parent_order_state: Option<OrderState>,
}

impl GetParentOrdersParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: Pagination) -> Self {
        self.page = page;
        self
    }

    pub fn with_state(mut self, state: OrderState) -> Self {
        self.parent_order_state = Some(state);
        self
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = self.page.render();
        if let Some(state) = self.parent_order_state {
            query.push(("parent_order_state", state.to_string()));
        }
        query
    }
}

/// Response of `/v1/me/getparentorder`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentOrderDetail {
    pub id: u64,
    pub parent_order_id: String,
    pub parent_order_acceptance_id: String,
    pub order_method: Option<OrderMethod>,
    pub minute_to_expire: u64,
    pub time_in_force: Option<TimeInForce>,
    pub parameters: Vec<ParentOrderLeg>,
}

fn push_opt(query: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        query.push((key, v.to_string()));
    }
}
