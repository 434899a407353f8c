use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;

use crate::api::AppState;
use crate::error::AppError;

fn client_id<B>(req: &Request<B>, addr: Option<SocketAddr>) -> String {
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(s) = forwarded.to_str() {
            if let Some(first) = s.split(',').next() {
                return first.trim().to_string();
            }
        }
    }
    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn enforce(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let id = client_id(&req, Some(addr));
    if !state.rate_limiter.check(&id) {
        return Err(AppError::RateLimited);
    }
    Ok(next.run(req).await)
}
