use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::AppError;

#[derive(Serialize)]
pub struct PackSizeResponse {
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn list_packs(
    State(state): State<AppState>,
) -> Result<Json<Vec<PackSizeResponse>>, AppError> {
    let records = state.coordinator.list_pack_sizes().await?;
    Ok(Json(
        records
            .into_iter()
            .map(|r| PackSizeResponse {
                size: r.size,
                created_at: DateTime::from_timestamp_millis(r.created_ms as i64)
                    .unwrap_or_else(Utc::now),
            })
            .collect(),
    ))
}

#[derive(Deserialize)]
pub struct CreatePackRequest {
    pub size: u64,
}

pub async fn create_pack(
    State(state): State<AppState>,
    Json(req): Json<CreatePackRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state.coordinator.add_pack_size(req.size).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("pack size {} created", req.size),
        }),
    ))
}

pub async fn delete_pack(
    State(state): State<AppState>,
    Path(size): Path<u64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.coordinator.delete_pack_size(size).await?;
    Ok(Json(MessageResponse {
        message: format!("pack size {size} deleted"),
    }))
}
