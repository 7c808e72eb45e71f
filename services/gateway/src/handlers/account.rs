use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use risk_engine::{AccountSummary, DEFAULT_SYMBOL};
use rust_decimal::Decimal;
use serde::Serialize;
use types::ids::TraderId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[serde(flatten)]
    pub summary: AccountSummary,
    pub mark_price: Decimal,
    pub open_positions: usize,
}

/// Margin account summary at the current mark price.
pub async fn get_account(
    State(state): State<AppState>,
    Path(pubkey): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let trader = TraderId::new(pubkey).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let mark_price = state.marks.mark_price(DEFAULT_SYMBOL);
    let positions = state.ledger.open_positions_for(&trader).await;
    let summary = state.margin.account_summary(&trader, &positions, mark_price);

    Ok(Json(AccountResponse {
        summary,
        mark_price: mark_price.as_decimal(),
        open_positions: positions.len(),
    }))
}
