//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use api::state::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use checkout::{CheckoutLinks, InMemoryOrderBackend, InMemoryPaymentBackend, Locale};
use chrono::{TimeZone, Utc};
use domain::{Money, Order, OrderStatus, PaymentMethod, PaymentStatus, PaymentTransaction};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestHarness {
    app: axum::Router,
    payments: InMemoryPaymentBackend,
    orders: InMemoryOrderBackend,
}

impl TestHarness {
    fn new() -> Self {
        let payments = InMemoryPaymentBackend::new();
        let orders = InMemoryOrderBackend::new();
        let state = Arc::new(AppState::new(
            Arc::new(payments.clone()),
            Arc::new(orders.clone()),
            CheckoutLinks::new("https://shop.test").unwrap(),
            Locale::En,
        ));
        let app = api::create_app(state, get_metrics_handle());

        Self {
            app,
            payments,
            orders,
        }
    }

    async fn send(&self, method: &str, uri: &str) -> axum::response::Response {
        self.app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = self.send("GET", uri).await;
        let status = response.status();
        (status, body_json(response).await)
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

fn order(id: &str, method: PaymentMethod, status: OrderStatus) -> Order {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let updated = Utc.with_ymd_and_hms(2024, 3, 3, 16, 30, 0).unwrap();
    Order::placed(id, method, created).with_status(status, updated)
}

#[tokio::test]
async fn test_health_check() {
    let harness = TestHarness::new();
    let (status, json) = harness.get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "storefront-checkout");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let harness = TestHarness::new();
    harness.send("GET", "/checkout/result?status=success").await;

    let response = harness.send("GET", "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("checkout_results_total"));
}

mod checkout_result {
    use super::*;

    #[tokio::test]
    async fn test_vnpay_success_answers_immediately() {
        let harness = TestHarness::new();
        let (status, json) = harness
            .get_json("/checkout/result?vnp_ResponseCode=00&vnp_TxnRef=ABC123&orderId=55")
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Payment succeeded.");
        assert_eq!(json["orderId"], "55");
        assert_eq!(json["verifying"], true);
        assert!(json["resultId"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_generic_redirect_is_not_verified() {
        let harness = TestHarness::new();
        let (_, json) = harness
            .get_json("/checkout/result?status=success&orderId=55")
            .await;

        assert_eq!(json["status"], "success");
        assert_eq!(json["verifying"], false);
        assert_eq!(harness.payments.status_lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_pending_result_is_upgraded_in_background() {
        let harness = TestHarness::new();
        harness.payments.insert_transaction(
            PaymentTransaction::pending("ABC123", "55", PaymentMethod::VnPay, Money::from_dong(1))
                .succeeded(Utc::now()),
        );

        let (_, mounted) = harness.get_json("/checkout/result?vnp_TxnRef=ABC123").await;
        assert_eq!(mounted["status"], "pending");
        assert_eq!(mounted["orderId"], serde_json::Value::Null);
        let uri = format!("/checkout/result/{}", mounted["resultId"].as_str().unwrap());

        let mut current = mounted;
        for _ in 0..50 {
            let (_, json) = harness.get_json(&uri).await;
            current = json;
            if current["verifying"] == false {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(current["status"], "success");
        assert_eq!(current["orderId"], "55");
    }

    #[tokio::test]
    async fn test_momo_order_id_does_not_replace_storefront_order_id() {
        let harness = TestHarness::new();
        harness.payments.insert_transaction(
            PaymentTransaction::pending(
                "momo_1700_abc",
                "55",
                PaymentMethod::Momo,
                Money::from_dong(1),
            )
            .succeeded(Utc::now()),
        );

        let (_, mounted) = harness
            .get_json("/checkout/result?orderId=55&partnerCode=MOMO&orderId=momo_1700_abc&resultCode=0")
            .await;
        assert_eq!(mounted["status"], "success");
        assert_eq!(mounted["orderId"], "55");
        let result_id = mounted["resultId"].as_str().unwrap().to_string();
        let uri = format!("/checkout/result/{result_id}");

        let mut current = mounted;
        for _ in 0..50 {
            let (_, json) = harness.get_json(&uri).await;
            current = json;
            if current["verifying"] == false {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(current["orderId"], "55");
        assert_eq!(
            harness.payments.status_lookups(),
            vec![common::TransactionId::new("momo_1700_abc")]
        );

        let response = harness.send("GET", &format!("{uri}/order")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/orders/55");
    }

    #[tokio::test]
    async fn test_unknown_result_is_not_found() {
        let harness = TestHarness::new();
        let uri = format!("/checkout/result/{}", uuid::Uuid::new_v4());
        let (status, json) = harness.get_json(&uri).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_open_order_unmounts_the_view() {
        let harness = TestHarness::new();
        let (_, mounted) = harness
            .get_json("/checkout/result?orderId=55&status=cancelled")
            .await;
        assert_eq!(mounted["status"], "failed");
        let result_id = mounted["resultId"].as_str().unwrap().to_string();

        let response = harness
            .send("GET", &format!("/checkout/result/{result_id}/order"))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/orders/55");

        let (status, _) = harness
            .get_json(&format!("/checkout/result/{result_id}"))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_open_order_without_order_id() {
        let harness = TestHarness::new();
        let (_, mounted) = harness.get_json("/checkout/result").await;
        assert_eq!(mounted["status"], "pending");
        let result_id = mounted["resultId"].as_str().unwrap();

        let response = harness
            .send("GET", &format!("/checkout/result/{result_id}/order"))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/orders");
    }
}

mod order_timeline {
    use super::*;

    #[tokio::test]
    async fn test_shipped_timeline() {
        let harness = TestHarness::new();
        harness
            .orders
            .insert(order("55", PaymentMethod::VnPay, OrderStatus::Shipped));

        let (status, json) = harness.get_json("/orders/55/timeline").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["orderId"], "55");
        assert_eq!(json["status"], "shipped");

        let steps = json["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0]["milestone"], "placed");
        assert_eq!(steps[3]["milestone"], "shipped");
        assert_eq!(steps[2]["completed"], true);
        assert_eq!(steps[3]["completed"], false);
    }

    #[tokio::test]
    async fn test_refunded_timeline_is_settled() {
        let harness = TestHarness::new();
        harness
            .orders
            .insert(order("56", PaymentMethod::Momo, OrderStatus::Refunded));

        let (_, json) = harness.get_json("/orders/56/timeline").await;
        let steps = json["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 6);
        assert_eq!(steps[4]["milestone"], "cancelled");
        assert_eq!(steps[5]["milestone"], "refunded");
        assert!(steps.iter().all(|step| step["completed"] == true));
    }

    #[tokio::test]
    async fn test_unknown_status_yields_empty_timeline() {
        let harness = TestHarness::new();
        let mut on_hold = order("57", PaymentMethod::Cod, OrderStatus::Pending);
        on_hold.status = "on_hold".to_string();
        harness.orders.insert(on_hold);

        let (status, json) = harness.get_json("/orders/57/timeline").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "on_hold");
        assert_eq!(json["steps"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_missing_order() {
        let harness = TestHarness::new();
        let (status, _) = harness.get_json("/orders/404/timeline").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_backend_failure_is_bad_gateway() {
        let harness = TestHarness::new();
        harness.orders.set_fail_on_get(true);
        let (status, json) = harness.get_json("/orders/55/timeline").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].as_str().is_some());
    }
}

mod pay_again {
    use super::*;

    #[tokio::test]
    async fn test_redirects_to_gateway() {
        let harness = TestHarness::new();
        harness
            .orders
            .insert(order("55", PaymentMethod::ZaloPay, OrderStatus::Confirmed));

        let response = harness.send("POST", "/orders/55/pay-again").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            "https://sandbox.zalopay.test/pay?ref=zalopay-55-0001"
        );

        let sent = harness.payments.session_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].return_url,
            "https://shop.test/checkout/result?orderId=55"
        );
    }

    #[tokio::test]
    async fn test_paid_order_conflicts() {
        let harness = TestHarness::new();
        harness.orders.insert(
            order("55", PaymentMethod::VnPay, OrderStatus::Confirmed)
                .with_payment_status(PaymentStatus::Paid),
        );

        let response = harness.send("POST", "/orders/55/pay-again").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(harness.payments.session_requests().is_empty());
    }

    #[tokio::test]
    async fn test_cash_on_delivery_conflicts() {
        let harness = TestHarness::new();
        harness
            .orders
            .insert(order("55", PaymentMethod::Cod, OrderStatus::Pending));

        let response = harness.send("POST", "/orders/55/pay-again").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(harness.payments.session_requests().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_order_conflicts() {
        let harness = TestHarness::new();
        harness
            .orders
            .insert(order("55", PaymentMethod::Momo, OrderStatus::Cancelled));

        let response = harness.send("POST", "/orders/55/pay-again").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_declined_session_is_bad_gateway() {
        let harness = TestHarness::new();
        harness
            .orders
            .insert(order("55", PaymentMethod::VnPay, OrderStatus::Pending));
        harness.payments.set_decline_create(Some("Invalid payment gateway"));

        let response = harness.send("POST", "/orders/55/pay-again").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid payment gateway");
    }

    #[tokio::test]
    async fn test_missing_order() {
        let harness = TestHarness::new();
        let response = harness.send("POST", "/orders/404/pay-again").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
