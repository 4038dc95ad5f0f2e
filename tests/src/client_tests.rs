//! End-to-end client scenarios against an in-memory transport
//!
//! Each test drives the public `BitflyerRestClient` API and inspects the
//! requests that reached the transport.

use flyer_exchanges::bitflyer::*;
use flyer_exchanges::http::{HttpMethod, HttpResponse};
use flyer_exchanges::mock::{query_params, request_path, MockTransport};
use flyer_exchanges::prelude::{EntryCondition, ExchangeError, OrderState, Side};
use rstest::*;
use serde_json::{json, Value};

// ============================================================================
// TEST FIXTURES
// ============================================================================

const API_KEY: &str = "fixture-key";
const API_SECRET: &str = "fixture-secret";

/// Client with credentials over an empty mock transport
#[fixture]
fn client() -> BitflyerRestClient<MockTransport> {
    flyer_core::init_logging();
    let config = BitflyerConfig::new().with_credentials(API_KEY, API_SECRET);
    BitflyerRestClient::with_transport(config, MockTransport::new()).unwrap()
}

fn parent_order(id: u64, state: &str) -> Value {
    json!({
        "id": id,
        "parent_order_id": format!("JCO{id}"),
        "product_code": "FX_BTC_JPY",
        "side": "SELL",
        "parent_order_type": "STOP",
        "price": 0,
        "average_price": 0,
        "size": 0.1,
        "parent_order_state": state,
        "expire_date": "2024-03-01T00:00:00",
        "parent_order_date": "2024-02-01T00:00:00.001",
        "parent_order_acceptance_id": format!("JRF-P{id}"),
        "outstanding_size": 0.1,
        "cancel_size": 0,
        "executed_size": 0,
        "total_commission": 0
    })
}

/// Client whose transport serves a parent order history of ids `1..=size`
fn client_with_history(size: u64, state: &'static str) -> BitflyerRestClient<MockTransport> {
    let transport = MockTransport::with_handler(move |request| {
        let query = query_params(request);
        let count: usize = query["count"].parse().unwrap();
        let before: u64 = query.get("before").map(|b| b.parse().unwrap()).unwrap_or(u64::MAX);

        let page: Vec<Value> = (1..=size)
            .rev()
            .filter(|id| *id < before)
            .take(count)
            .map(|id| parent_order(id, state))
            .collect();
        Ok(HttpResponse::new(200, Value::Array(page).to_string()))
    });
    let config = BitflyerConfig::new().with_credentials(API_KEY, API_SECRET);
    BitflyerRestClient::with_transport(config, transport).unwrap()
}

fn sent_body(client: &BitflyerRestClient<MockTransport>) -> Value {
    let request = client.transport().last_request().unwrap();
    serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
}

// ============================================================================
// REQUEST SHAPE TESTS
// ============================================================================

#[cfg(test)]
mod request_tests {
    use super::*;

    #[rstest]
    #[case::balance("balance", "/v1/me/getbalance", true)]
    #[case::board("board", "/v1/getboard", false)]
    #[case::executions("executions", "/v1/me/getexecutions", true)]
    #[case::child_orders("child_orders", "/v1/me/getchildorders", true)]
    #[case::parent_orders("parent_orders", "/v1/me/getparentorders", true)]
    #[case::parent_order("parent_order", "/v1/me/getparentorder", true)]
    #[monoio::test]
    async fn test_endpoint_paths(
        client: BitflyerRestClient<MockTransport>,
        #[case] op: &str,
        #[case] path: &str,
        #[case] private: bool,
    ) {
        let body = if op == "board" || op == "parent_order" { "{}" } else { "[]" };
        client.transport().push_response(200, body);

        let result = match op {
            "balance" => client.get_balance().await.map(|_| ()),
            "board" => client.get_board().await.map(|_| ()),
            "executions" => client.get_executions(&GetExecutionsParams::new()).await.map(|_| ()),
            "child_orders" => client.get_child_orders(&GetChildOrdersParams::new()).await.map(|_| ()),
            "parent_orders" => client.get_parent_orders(&GetParentOrdersParams::new()).await.map(|_| ()),
            "parent_order" => client.get_parent_order("JRF-1").await.map(|_| ()),
            other => panic!("unknown op {other}"),
        };
        assert!(result.is_ok(), "{op}: {result:?}");

        let request = client.transport().last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request_path(&request), path);
        assert!(request.body.is_none(), "GET must not carry a body");
        assert_eq!(request.header_value("Content-Type"), Some("application/json"));
        assert_eq!(request.header_value("ACCESS-KEY").is_some(), private);
        assert_eq!(request.header_value("ACCESS-SIGN").is_some(), private);
    }

    #[rstest]
    #[monoio::test]
    async fn test_signature_matches_sent_url(client: BitflyerRestClient<MockTransport>) {
        client.transport().push_response(200, "[]");
        let params = GetChildOrdersParams::new()
            .with_page(Pagination::new().with_count(20).with_before(900))
            .with_state(OrderState::Active);
        client.get_child_orders(&params).await.unwrap();

        let request = client.transport().last_request().unwrap();
        let path_and_query = request.url.trim_start_matches(BITFLYER_API_URL);
        assert_eq!(
            path_and_query,
            "/v1/me/getchildorders?before=900&child_order_state=ACTIVE&count=20&product_code=FX_BTC_JPY"
        );

        let ts = request.header_value("ACCESS-TIMESTAMP").unwrap();
        let expected = sign(API_SECRET, ts, "GET", path_and_query, "").unwrap();
        assert_eq!(request.header_value("ACCESS-SIGN"), Some(expected.as_str()));
    }

    #[rstest]
    #[monoio::test]
    async fn test_executions_filter_by_acceptance_id(client: BitflyerRestClient<MockTransport>) {
        client.transport().push_response(200, "[]");
        client
            .get_executions_by_acceptance_id("JRF20150707-060559-396699")
            .await
            .unwrap();

        let query = query_params(&client.transport().last_request().unwrap());
        assert_eq!(query["child_order_acceptance_id"], "JRF20150707-060559-396699");
        assert!(!query.contains_key("count"));
    }

    #[rstest]
    #[monoio::test]
    async fn test_product_code_is_client_scoped() {
        let config = BitflyerConfig::new()
            .with_credentials(API_KEY, API_SECRET)
            .with_product_code("BTC_JPY");
        let client = BitflyerRestClient::with_transport(config, MockTransport::new()).unwrap();
        client.transport().push_response(200, r#"{"parent_order_acceptance_id":"JRF1"}"#);

        let request = SendParentOrderRequest::simple(ParentOrderLeg::market(Side::Buy, 0.01));
        client.send_parent_order(request).await.unwrap();

        assert_eq!(sent_body(&client)["parameters"][0]["product_code"], "BTC_JPY");
    }
}

// ============================================================================
// ORDER SUBMISSION TESTS
// ============================================================================

#[cfg(test)]
mod order_tests {
    use super::*;

    #[rstest]
    #[case::stop_buy(EntryCondition::Stop, Side::Buy, "STOP", "trigger_price", "SELL")]
    #[case::limit_buy(EntryCondition::Limit, Side::Buy, "LIMIT", "price", "SELL")]
    #[case::stop_sell(EntryCondition::Stop, Side::Sell, "STOP", "trigger_price", "BUY")]
    #[case::limit_sell(EntryCondition::Limit, Side::Sell, "LIMIT", "price", "BUY")]
    #[monoio::test]
    async fn test_ifdoco_leg_layout(
        client: BitflyerRestClient<MockTransport>,
        #[case] entry: EntryCondition,
        #[case] side: Side,
        #[case] entry_type: &str,
        #[case] entry_price_field: &str,
        #[case] exit_side: &str,
    ) {
        client.transport().push_response(200, r#"{"parent_order_acceptance_id":"JRF-IFDOCO"}"#);
        client
            .send_parent_order_ifdoco(entry, side, 100.0, 110.0, 90.0, 1.0)
            .await
            .unwrap();

        let body = sent_body(&client);
        assert_eq!(body["order_method"], "IFDOCO");
        assert_eq!(body["minute_to_expire"], 43200);
        assert_eq!(body["time_in_force"], "GTC");

        let legs = body["parameters"].as_array().unwrap();
        assert_eq!(legs.len(), 3);

        assert_eq!(legs[0]["condition_type"], entry_type);
        assert_eq!(legs[0]["side"], side.as_str());
        assert_eq!(legs[0][entry_price_field], 100.0);

        assert_eq!(legs[1]["condition_type"], "LIMIT");
        assert_eq!(legs[1]["side"], exit_side);
        assert_eq!(legs[1]["price"], 110.0);

        assert_eq!(legs[2]["condition_type"], "STOP");
        assert_eq!(legs[2]["side"], exit_side);
        assert_eq!(legs[2]["trigger_price"], 90.0);

        for leg in legs {
            assert_eq!(leg["size"], 1.0);
            assert_eq!(leg["product_code"], "FX_BTC_JPY");
        }
    }

    #[rstest]
    #[case("JRF20150707-050237-639234")]
    #[case("JRF20240101-000000-000001")]
    #[case("00012345")]
    #[monoio::test]
    async fn test_acceptance_id_round_trip(client: BitflyerRestClient<MockTransport>, #[case] id: &str) {
        client
            .transport()
            .push_response(200, json!({ "child_order_acceptance_id": id }).to_string());

        let response = client.send_child_order_limit(Side::Sell, 3_500_000.0, 0.01).await.unwrap();
        assert_eq!(response.child_order_acceptance_id, id);
    }

    #[rstest]
    #[monoio::test]
    async fn test_market_order_body(client: BitflyerRestClient<MockTransport>) {
        client.transport().push_response(200, r#"{"child_order_acceptance_id":"JRF-M"}"#);
        client.send_child_order_market(Side::Buy, 0.05).await.unwrap();

        let body = sent_body(&client);
        assert_eq!(body["child_order_type"], "MARKET");
        assert_eq!(body["side"], "BUY");
        assert!(body.get("price").is_none());
    }

    #[rstest]
    #[case(400, r#"{"status":-205,"error_message":"Margin amount is insufficient for this order.","data":null}"#)]
    #[case(401, r#"{"status":-500,"error_message":"Key not found","data":null}"#)]
    #[monoio::test]
    async fn test_rejected_order_is_hard_failure(
        client: BitflyerRestClient<MockTransport>,
        #[case] status: u16,
        #[case] body: &str,
    ) {
        client.transport().push_response(status, body);

        let err = client.send_child_order_market(Side::Sell, 1.0).await.unwrap_err();
        assert_eq!(
            err,
            ExchangeError::Api {
                status,
                body: body.to_string()
            }
        );
        assert!(!err.is_retryable());
    }
}

// ============================================================================
// ORDER STATE RESOLUTION TESTS
// ============================================================================

#[cfg(test)]
mod resolver_tests {
    use super::*;

    #[rstest]
    #[monoio::test]
    async fn test_found_in_first_page() {
        let client = client_with_history(50, "COMPLETED");
        // Position 49 in a newest-first page of 50
        let state = client.find_parent_order_state("JRF-P2").await.unwrap();
        assert_eq!(state, OrderState::Completed);
        assert_eq!(client.transport().request_count(), 1);
    }

    #[rstest]
    #[case::short_history(50, 3)]
    #[case::exact_first_window(100, 3)]
    #[case::spans_all_windows(600, 3)]
    #[case::longer_than_windows(5000, 3)]
    #[monoio::test]
    async fn test_absent_id_not_found(#[case] history: u64, #[case] fetches: usize) {
        let client = client_with_history(history, "ACTIVE");
        let err = client.find_parent_order_state("JRF-missing").await.unwrap_err();

        assert_eq!(
            err,
            ExchangeError::NotFound {
                acceptance_id: "JRF-missing".to_string()
            }
        );
        assert_eq!(client.transport().request_count(), fetches);
    }

    #[rstest]
    #[monoio::test]
    async fn test_windows_never_overlap() {
        let client = client_with_history(1200, "ACTIVE");
        // Id 1 is only reached by the third window
        let state = client.find_parent_order_state("JRF-P1").await.unwrap();
        assert_eq!(state, OrderState::Active);

        let befores: Vec<Option<String>> = client
            .transport()
            .requests()
            .iter()
            .map(|r| query_params(r).get("before").cloned())
            .collect();
        assert_eq!(befores, vec![None, Some("1101".to_string()), Some("701".to_string())]);
    }

    #[rstest]
    #[monoio::test]
    async fn test_unknown_state_is_tolerated() {
        let client = client_with_history(3, "SOMETHING_NEW");
        let state = client.find_parent_order_state("JRF-P3").await.unwrap();
        assert_eq!(state, OrderState::Unknown);
    }
}
