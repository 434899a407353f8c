use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The full error taxonomy for the service.
///
/// Every variant is total and synchronous at the point it is raised; the
/// solver and cache never produce variants outside `InvalidAmount` /
/// `NoConfig` and the impossible-by-construction cache case respectively.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("amount must be a positive integer")]
    InvalidAmount,

    #[error("amount exceeds the maximum order quantity")]
    AmountTooLarge,

    #[error("no pack sizes are configured")]
    NoConfig,

    #[error("pack size {0} already exists")]
    DuplicatePackSize(u64),

    #[error("pack size {0} is not configured")]
    UnknownPackSize(u64),

    #[error("pack size must be a positive integer")]
    InvalidPackSize,

    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("storage error: {0}")]
    StoreError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidAmount
            | AppError::AmountTooLarge
            | AppError::NoConfig
            | AppError::InvalidPackSize => StatusCode::BAD_REQUEST,
            AppError::DuplicatePackSize(_) => StatusCode::CONFLICT,
            AppError::UnknownPackSize(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::StoreError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, AppError::StoreError(_) | AppError::InternalError(_)) {
            tracing::error!(error = %self, "request failed with server error");
        }

        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<crate::store::StoreError> for AppError {
    fn from(e: crate::store::StoreError) -> Self {
        match e {
            crate::store::StoreError::Duplicate(size) => AppError::DuplicatePackSize(size),
            crate::store::StoreError::NotFound(size) => AppError::UnknownPackSize(size),
            crate::store::StoreError::Backend(msg) => AppError::StoreError(msg),
        }
    }
}

impl From<crate::journal::JournalError> for AppError {
    fn from(e: crate::journal::JournalError) -> Self {
        match e {
            crate::journal::JournalError::Backend(msg) => AppError::StoreError(msg),
        }
    }
}

impl From<crate::solver::SolverError> for AppError {
    fn from(e: crate::solver::SolverError) -> Self {
        match e {
            crate::solver::SolverError::InvalidAmount => AppError::InvalidAmount,
            crate::solver::SolverError::NoConfig => AppError::NoConfig,
            crate::solver::SolverError::NoSolution => {
                AppError::InternalError("solver found no feasible solution".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400() {
        assert_eq!(AppError::InvalidAmount.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::AmountTooLarge.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NoConfig.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidPackSize.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn duplicate_pack_size_maps_to_409() {
        assert_eq!(
            AppError::DuplicatePackSize(250).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn unknown_pack_size_maps_to_404() {
        assert_eq!(
            AppError::UnknownPackSize(250).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn auth_and_rate_limit_map_correctly() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::RateLimited.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn server_errors_map_to_500() {
        assert_eq!(
            AppError::StoreError("down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::InternalError("oops".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
