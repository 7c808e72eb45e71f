use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use persistence::PlatformMetrics;
use risk_engine::DEFAULT_SYMBOL;

/// Platform-wide aggregates: settled volume, open interest at the current
/// mark, trade count, distinct traders.
pub async fn get_metrics(
    State(state): State<AppState>,
) -> Result<Json<PlatformMetrics>, AppError> {
    let mark_price = state.marks.mark_price(DEFAULT_SYMBOL);
    let metrics = state
        .store
        .metrics(mark_price)
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(metrics))
}
