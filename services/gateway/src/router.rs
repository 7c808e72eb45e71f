use crate::handlers::{account, book, metrics, order, trader, webhook};
use crate::models::HealthResponse;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/orders", post(order::create_order))
        .route("/orderbook", get(book::get_orderbook))
        .route("/traders/{pubkey}/orders", get(trader::get_orders))
        .route("/traders/{pubkey}/trades", get(trader::get_trades))
        .route("/traders/{pubkey}/positions", get(trader::get_positions))
        .route("/account/{pubkey}", get(account::get_account))
        .route("/metrics", get(metrics::get_metrics));

    Router::new()
        .nest("/api", api_routes)
        .route("/webhooks/settlement", post(webhook::receive_webhook))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        timestamp: types::now_nanos(),
        service: "matching-core",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::harness;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;
    use types::ids::TraderId;

    const BUYER: &str = "buyer111111111111111111111111111";

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(harness().state);
        let response = app.oneshot(get_req("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], json!(true));
    }

    #[tokio::test]
    async fn test_submit_order_rests_on_book() {
        let h = harness();
        let app = create_router(h.state.clone());

        let response = app
            .clone()
            .oneshot(post(
                "/api/orders",
                json!({ "userPubkey": BUYER, "side": "long", "size": "10", "price": "50" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], json!(true));
        assert!(body["orderId"].is_string());

        let response = app.oneshot(get_req("/api/orderbook")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["bids"].as_array().unwrap().len(), 1);
        assert_eq!(body["asks"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_submit_order_validation() {
        let app = create_router(harness().state);
        let response = app
            .oneshot(post(
                "/api/orders",
                json!({ "userPubkey": BUYER, "side": "long", "size": "0", "price": "50" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_margin_rejection_carries_shortfall() {
        let h = harness();
        h.state
            .margin
            .set_margin_balance(&TraderId::new(BUYER).unwrap(), Decimal::from(100));
        let app = create_router(h.state);

        // Notional 1,050 at 10x needs 105 against equity 100
        let response = app
            .oneshot(post(
                "/api/orders",
                json!({ "userPubkey": BUYER, "side": "long", "size": "21", "price": "50" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], json!("INSUFFICIENT_MARGIN"));
        assert_eq!(body["shortfall"], json!("5"));
        assert_eq!(body["required"], json!("105"));
    }

    #[tokio::test]
    async fn test_trader_scoped_orders() {
        let h = harness();
        let app = create_router(h.state.clone());

        app.clone()
            .oneshot(post(
                "/api/orders",
                json!({ "userPubkey": BUYER, "side": "long", "size": "10", "price": "50" }),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(get_req(&format!("/api/traders/{BUYER}/orders")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        // Another trader sees nothing
        let response = app
            .oneshot(get_req(
                "/api/traders/other111111111111111111111111111/orders",
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_account_summary_defaults() {
        let app = create_router(harness().state);
        let response = app
            .oneshot(get_req(&format!("/api/account/{BUYER}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["marginBalance"], json!("1000"));
        assert_eq!(body["openPositions"], json!(0));
    }

    #[tokio::test]
    async fn test_webhook_always_acknowledges() {
        let app = create_router(harness().state);
        let response = app
            .clone()
            .oneshot(post("/webhooks/settlement", json!({ "unexpected": "shape" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["received"], json!(true));

        let response = app
            .oneshot(post(
                "/webhooks/settlement",
                json!({ "webhook_id": "wh-1", "txs": [] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = create_router(harness().state);
        let response = app.oneshot(get_req("/api/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["trade_count"], json!(0));
    }
}
