use crate::error::AppError;
use crate::models::{CreateOrderRequest, CreateOrderResponse};
use crate::state::AppState;
use axum::{extract::State, Json};
use risk_engine::DEFAULT_SYMBOL;
use rust_decimal::Decimal;
use tracing::{info, warn};
use types::errors::OrderError;
use types::ids::TraderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

/// Order admission: validate, gate on initial margin, persist, then rest
/// the order on the book. The matching loop takes it from there.
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    let trader = TraderId::new(payload.user_pubkey)
        .map_err(|e| OrderError::InvalidTrader(e.to_string()))?;
    let price = Price::try_new(payload.price).ok_or(OrderError::InvalidPrice)?;
    if payload.size <= Decimal::ZERO {
        return Err(OrderError::InvalidSize.into());
    }
    let size = Quantity::try_new(payload.size).ok_or(OrderError::InvalidSize)?;

    let mark_price = state.marks.mark_price(DEFAULT_SYMBOL);
    let positions = state.ledger.open_positions_for(&trader).await;
    let check = state.margin.check_initial_margin(
        &trader,
        size,
        price,
        &positions,
        mark_price,
        payload.leverage,
    );
    if !check.allowed {
        return Err(OrderError::MarginShortfall {
            equity: check.equity,
            required: check.required,
            shortfall: check.shortfall,
        }
        .into());
    }

    let order = Order::new(trader, payload.side, size, price, types::now_nanos());

    let hash = state.hasher.hash(&order.trader);
    if let Err(err) = state.store.save_order(&hash, &order) {
        warn!(order_id = %order.order_id, error = %err, "order save failed");
    }

    let order_id = order.order_id;
    {
        let mut book = state.book.lock().await;
        book.add(order.clone())?;
    }

    info!(
        order_id = %order_id,
        trader = %order.trader.abbrev(),
        side = ?order.side,
        size = %order.size,
        price = %order.price,
        "order admitted"
    );

    Ok(Json(CreateOrderResponse {
        ok: true,
        order_id,
        message: "Order added to orderbook",
    }))
}
