use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::api::AppState;
use crate::error::AppError;

/// `amount` is deserialized as a raw JSON number rather than `u64` so that
/// negative and non-integer inputs reach `AppError::InvalidAmount` (400)
/// instead of being rejected by the `Json` extractor itself as a 422 before
/// the handler ever runs.
#[derive(Deserialize)]
pub struct CalculateRequest {
    pub amount: Number,
}

#[derive(Serialize)]
pub struct CalculateResponse {
    pub amount: u64,
    pub total_items: u64,
    pub total_packs: u64,
    pub packs: BTreeMap<String, u64>,
}

pub async fn post_calculate(
    State(state): State<AppState>,
    Json(req): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, AppError> {
    let amount = req.amount.as_u64().ok_or(AppError::InvalidAmount)?;

    let solution = state.coordinator.calculate(amount).await?;

    let packs = solution
        .packs
        .into_iter()
        .map(|(size, count)| (size.to_string(), count))
        .collect();

    Ok(Json(CalculateResponse {
        amount,
        total_items: solution.total_items,
        total_packs: solution.total_packs,
        packs,
    }))
}
