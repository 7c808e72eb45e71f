//! Wire models for the HTTP surface

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::OrderId;
use types::order::{Order, OrderStatus, Side};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_pubkey: String,
    pub side: Side,
    pub size: Decimal,
    pub price: Decimal,
    #[serde(default)]
    pub leverage: Option<u8>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub ok: bool,
    pub order_id: OrderId,
    pub message: &'static str,
}

/// Trader-scoped order view. Raw identity is implied by the request path
/// and not repeated in the body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order_id: OrderId,
    pub side: Side,
    pub size: Decimal,
    pub filled: Decimal,
    pub price: Decimal,
    pub status: OrderStatus,
    pub created_at: i64,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id,
            side: order.side,
            size: order.size.as_decimal(),
            filled: order.filled.as_decimal(),
            price: order.price.as_decimal(),
            status: order.status,
            created_at: order.created_at,
        }
    }
}

/// Trader-scoped trade view. The counterparty never appears: executions in
/// a dark pool reveal price and size to the two parties, nothing more.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeView {
    pub trade_id: types::ids::TradeId,
    /// This trader's direction in the execution
    pub side: Side,
    pub price: Decimal,
    pub size: Decimal,
    pub settlement_status: types::trade::SettlementStatus,
    pub created_at: i64,
    pub settled_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionView {
    pub position_id: uuid::Uuid,
    pub side: Side,
    pub size: Decimal,
    pub entry_price: Decimal,
    pub leverage: u8,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub status: types::position::PositionStatus,
    pub opened_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub timestamp: i64,
    pub service: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}
