use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct ListOrdersQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub amount: u64,
    pub total_items: u64,
    pub total_packs: u64,
    pub packs: BTreeMap<String, u64>,
    pub cache_hit: bool,
    pub created_at: DateTime<Utc>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let records = state.coordinator.list_orders(query.limit).await?;

    Ok(Json(
        records
            .into_iter()
            .map(|r| OrderResponse {
                order_id: r.order_id,
                amount: r.amount,
                total_items: r.total_items,
                total_packs: r.total_packs,
                packs: r
                    .packs
                    .into_iter()
                    .map(|(size, count)| (size.to_string(), count))
                    .collect(),
                cache_hit: r.cache_hit,
                created_at: r.created_at,
            })
            .collect(),
    ))
}
