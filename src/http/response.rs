use crate::errors::AppError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

/// Stable status and code of an error as seen by API clients.
pub fn error_status(err: &AppError) -> (StatusCode, &'static str) {
    match err {
        AppError::InvalidDate(_) => (StatusCode::BAD_REQUEST, "INVALID_DATE"),
        AppError::Validation(_)
        | AppError::InvalidTimestamp(_)
        | AppError::InvalidEventType(_)
        | AppError::Json(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
        AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
        AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
    }
}

#[must_use]
pub fn error_body(code: &str, message: &str, details: Value) -> Value {
    json!({"error": {"code": code, "message": message, "details": details}})
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = error_status(&self);
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal error".to_string()
        } else {
            if self.is_input_error() {
                tracing::debug!(error = %self, "request rejected");
            }
            self.to_string()
        };
        (status, Json(error_body(code, &message, Value::Null))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_map_to_400() {
        assert_eq!(
            error_status(&AppError::InvalidDate("x".into())),
            (StatusCode::BAD_REQUEST, "INVALID_DATE")
        );
        assert_eq!(
            error_status(&AppError::Validation("x".into())).1,
            "VALIDATION_FAILED"
        );
    }

    #[test]
    fn storage_errors_are_internal() {
        let err = AppError::Other("disk on fire".into());
        assert_eq!(error_status(&err).0, StatusCode::INTERNAL_SERVER_ERROR);
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
