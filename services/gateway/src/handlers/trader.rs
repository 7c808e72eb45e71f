//! Trader-scoped reads
//!
//! Every query goes through the identity hash, so the store is only ever
//! consulted with the privacy-preserving key. The raw pubkey from the path
//! is used once, to compute the hash and tell which side of a trade the
//! caller was on.

use crate::error::AppError;
use crate::models::{OrderView, PositionView, TradeView};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use risk_engine::DEFAULT_SYMBOL;
use types::ids::TraderId;
use types::order::Side;

fn parse_trader(pubkey: String) -> Result<TraderId, AppError> {
    TraderId::new(pubkey).map_err(|e| AppError::BadRequest(e.to_string()))
}

pub async fn get_orders(
    State(state): State<AppState>,
    Path(pubkey): Path<String>,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let trader = parse_trader(pubkey)?;
    let hash = state.hasher.hash(&trader);
    let orders = state
        .store
        .orders_for(&hash)
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

pub async fn get_trades(
    State(state): State<AppState>,
    Path(pubkey): Path<String>,
) -> Result<Json<Vec<TradeView>>, AppError> {
    let trader = parse_trader(pubkey)?;
    let hash = state.hasher.hash(&trader);
    let trades = state
        .store
        .trades_for(&hash)
        .map_err(|e| AppError::Internal(e.into()))?;

    let views = trades
        .into_iter()
        .map(|trade| {
            let side = if trade.buyer == trader {
                Side::Long
            } else {
                Side::Short
            };
            TradeView {
                trade_id: trade.trade_id,
                side,
                price: trade.price.as_decimal(),
                size: trade.size.as_decimal(),
                settlement_status: trade.settlement_status,
                created_at: trade.created_at,
                settled_at: trade.settled_at,
            }
        })
        .collect();
    Ok(Json(views))
}

pub async fn get_positions(
    State(state): State<AppState>,
    Path(pubkey): Path<String>,
) -> Result<Json<Vec<PositionView>>, AppError> {
    let trader = parse_trader(pubkey)?;
    let hash = state.hasher.hash(&trader);
    let mark_price = state.marks.mark_price(DEFAULT_SYMBOL);
    let positions = state
        .store
        .positions_for(&hash)
        .map_err(|e| AppError::Internal(e.into()))?;

    let views = positions
        .into_iter()
        .map(|p| PositionView {
            position_id: p.position_id,
            side: p.side,
            size: p.size.as_decimal(),
            entry_price: p.entry_price.as_decimal(),
            leverage: p.leverage,
            realized_pnl: p.realized_pnl,
            unrealized_pnl: if p.is_open() {
                p.unrealized_pnl(mark_price)
            } else {
                rust_decimal::Decimal::ZERO
            },
            status: p.status,
            opened_at: p.opened_at,
        })
        .collect();
    Ok(Json(views))
}
