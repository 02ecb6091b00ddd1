use actix_web::{HttpResponse, http::StatusCode};
use thiserror::Error;

use crate::http::error_body;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    JWT(#[from] jsonwebtoken::errors::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis pool error: {0}")]
    RedisPool(#[from] deadpool_redis::PoolError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === APPLICATION ERRORS ===
    #[error("Authorization error: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("No active plan found")]
    NoActivePlan,

    #[error("Invalid plan configuration: {0}")]
    InvalidPlanConfig(String),

    #[error("Monthly usage limit exceeded ({used}/{limit})")]
    QuotaExceeded { used: i64, limit: i64 },

    #[error("Upstream request failed with status {status}")]
    UpstreamFetch { status: u16 },

    #[error("Failed to extract catalog: {0}")]
    ExtractionFailed(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Upstream statuses that mean "slow", not "broken".
    fn is_upstream_timeout(status: u16) -> bool {
        status == StatusCode::REQUEST_TIMEOUT.as_u16()
            || status == StatusCode::GATEWAY_TIMEOUT.as_u16()
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) | AppError::JWT(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NoActivePlan => StatusCode::FORBIDDEN,
            AppError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamFetch { status } if Self::is_upstream_timeout(*status) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            AppError::Reqwest(error) if error.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        let is_dev = cfg!(debug_assertions);
        let status = self.status_code();

        let to_internal_json = |err_msg: &str| {
            if is_dev {
                error_body(err_msg)
            } else {
                error_body("Internal server error")
            }
        };

        match self {
            // === CONVERSION ERRORS ===
            AppError::Database(_)
            | AppError::Reqwest(_)
            | AppError::Redis(_)
            | AppError::RedisPool(_)
            | AppError::Json(_)
            | AppError::Internal(_)
            | AppError::InvalidPlanConfig(_) => {
                log::error!("{}", self);
                if status == StatusCode::GATEWAY_TIMEOUT {
                    HttpResponse::build(status).json(error_body("Upstream request timed out"))
                } else {
                    HttpResponse::build(status).json(to_internal_json(&self.to_string()))
                }
            }
            AppError::JWT(error) => {
                log::debug!("JWT rejected: {}", error);
                HttpResponse::build(status).json(error_body("Unauthorized"))
            }

            // === APPLICATION ERRORS ===
            AppError::UpstreamFetch { .. } | AppError::ExtractionFailed(_) => {
                log::error!("{}", self);
                HttpResponse::build(status).json(error_body(&self.to_string()))
            }
            _ => HttpResponse::build(status).json(error_body(&self.to_string())),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_message_carries_both_counts() {
        let err = AppError::QuotaExceeded { used: 10, limit: 10 };
        assert_eq!(err.to_string(), "Monthly usage limit exceeded (10/10)");
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn upstream_timeouts_map_to_gateway_timeout() {
        assert_eq!(
            AppError::UpstreamFetch { status: 504 }.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AppError::UpstreamFetch { status: 408 }.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AppError::UpstreamFetch { status: 403 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn extraction_failure_is_a_server_error() {
        let err = AppError::ExtractionFailed("no config script".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
