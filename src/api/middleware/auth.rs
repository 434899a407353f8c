use axum::extract::{Query, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use serde::Deserialize;

use crate::api::AppState;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct ApiKeyQuery {
    api_key: Option<String>,
}

/// Gates mutating `/api/packs*` routes behind `X-API-Key` or `?api_key=`
/// when the server is configured with a secret. No-op when unconfigured.
pub async fn require_api_key(
    State(state): State<AppState>,
    Query(query): Query<ApiKeyQuery>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.api_key.as_deref() else {
        return Ok(next.run(req).await);
    };

    let header_key = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let provided = header_key.or(query.api_key);

    match provided {
        Some(ref key) if key == expected => Ok(next.run(req).await),
        _ => Err(AppError::Unauthorized),
    }
}
