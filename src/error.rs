use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed table {table}: {message}")]
    Malformed { table: String, message: String },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for failures of the backing store, which the snapshot loader retries
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            AppError::DataUnavailable(_)
                | AppError::Database(_)
                | AppError::Io(_)
                | AppError::Malformed { .. }
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DataUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Database(_)
            | AppError::Io(_)
            | AppError::Malformed { .. }
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let response = AppError::InvalidRequest("customer_id is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_data_unavailable_maps_to_service_unavailable() {
        let response = AppError::DataUnavailable("no snapshot loaded".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_store_failures_are_classified() {
        let io = AppError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(io.is_store_failure());
        assert!(!AppError::InvalidRequest("x".to_string()).is_store_failure());
        assert!(!AppError::Internal("x".to_string()).is_store_failure());
    }

    #[test]
    fn test_malformed_display() {
        let err = AppError::Malformed {
            table: "popularity".to_string(),
            message: "expected array".to_string(),
        };
        assert_eq!(err.to_string(), "Malformed table popularity: expected array");
    }
}
