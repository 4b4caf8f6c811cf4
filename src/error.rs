use thiserror::Error;

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Asset host error: {0}")]
    AssetHost(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the error is the caller's fault and its message may be shown to them.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Auth(_)
                | AppError::NotFound(_)
                | AppError::Forbidden(_)
                | AppError::BadRequest(_)
                | AppError::Conflict(_)
        )
    }

    /// The bare message, without the variant prefix.
    pub fn into_message(self) -> String {
        match self {
            AppError::Database(msg)
            | AppError::AssetHost(msg)
            | AppError::Mail(msg)
            | AppError::Auth(msg)
            | AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::Config(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

/// Helper conversion from anyhow::Error
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}
