//! HTTP mapping for lookup failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

use crate::application::query::QueryError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl QueryError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal details stay in the log.
        let message = match &self {
            Self::Internal(detail) => {
                error!(error = %detail, "Order lookup failed");
                status
                    .canonical_reason()
                    .unwrap_or("Internal Server Error")
                    .to_string()
            }
            other => {
                debug!(error = %other, "Order lookup rejected");
                other.to_string()
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderId;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            QueryError::InvalidId("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            QueryError::NotFound(OrderId::new(1)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            QueryError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
