use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::envelope::Envelope;
use crate::error::AppError;

/// Message returned for every server-side failure. The real cause only goes to the log.
pub const GENERIC_ERROR_MESSAGE: &str = "Some error occurred";

/// Converts AppError into the `{ success: false, message }` envelope.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_)
            | AppError::AssetHost(_)
            | AppError::Mail(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if self.is_client_error() {
            self.into_message()
        } else {
            tracing::error!(error = %self, "request failed");
            GENERIC_ERROR_MESSAGE.to_string()
        };

        (status, axum::Json(Envelope::<()>::failure(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Auth("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::AssetHost("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_server_errors_do_not_leak_details() {
        let response = AppError::Database("connection refused at 10.0.0.3".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], GENERIC_ERROR_MESSAGE);
    }

    async fn message_of(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["message"].clone()
    }

    #[tokio::test]
    async fn test_message_follows_error_class() {
        let cases = [
            (AppError::Conflict("User already exists".into()), "User already exists"),
            (AppError::Auth("Unauthorised user!".into()), "Unauthorised user!"),
            (AppError::NotFound("Service not found".into()), "Service not found"),
            (AppError::Mail("SMTP timeout".into()), GENERIC_ERROR_MESSAGE),
            (AppError::Config("missing JWT_SECRET".into()), GENERIC_ERROR_MESSAGE),
            (AppError::Internal("poisoned lock".into()), GENERIC_ERROR_MESSAGE),
        ];
        for (err, expected) in cases {
            assert_eq!(err.is_client_error(), expected != GENERIC_ERROR_MESSAGE);
            assert_eq!(message_of(err).await, expected);
        }
    }

    #[tokio::test]
    async fn test_client_errors_keep_message() {
        let response = AppError::BadRequest("guests is required".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "guests is required");
    }
}
