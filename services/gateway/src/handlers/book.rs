use crate::state::AppState;
use axum::{extract::State, Json};
use matching_engine::BookLevel;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct OrderbookResponse {
    pub ok: bool,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub timestamp: i64,
}

/// Aggregated depth snapshot. Identity never leaves the book.
pub async fn get_orderbook(State(state): State<AppState>) -> Json<OrderbookResponse> {
    let snapshot = {
        let book = state.book.lock().await;
        book.snapshot()
    };
    Json(OrderbookResponse {
        ok: true,
        bids: snapshot.bids,
        asks: snapshot.asks,
        timestamp: types::now_nanos(),
    })
}
