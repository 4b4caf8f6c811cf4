use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Uniform JSON response wrapper shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

pub type ApiResult<T> = Result<axum::Json<Envelope<T>>, AppError>;

pub type CreatedResult<T> = Result<(StatusCode, axum::Json<Envelope<T>>), AppError>;

/// Unwrap a JSON body, turning axum's rejection into a 400 envelope.
pub fn json_body<T>(body: Result<axum::Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|axum::Json(value)| value)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e.body_text())))
}
