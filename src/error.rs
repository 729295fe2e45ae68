use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::crypto::aes::CryptoError;
use crate::repositories::store::StoreError;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The master key has the wrong length. Fatal at startup.
    #[error("Invalid master key: {0}")]
    InvalidKey(String),

    /// The PAN is not 12 to 19 digits.
    #[error("Invalid PAN: {0}")]
    InvalidPan(String),

    /// No record exists for the token.
    #[error("Token not found")]
    TokenNotFound,

    /// A persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Sealing the PAN failed.
    #[error("Encryption failed")]
    Encryption,

    /// The stored record could not be decrypted. Carries no detail.
    #[error("Decryption failed")]
    Decryption,

    /// The caller is not allowed to resolve PANs.
    #[error("Invalid admin API key")]
    Unauthorized,

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<CryptoError> for AppError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidKey(len) => AppError::InvalidKey(format!(
                "must be 16, 24, or 32 bytes, got {}",
                len
            )),
            CryptoError::Encryption => AppError::Encryption,
            CryptoError::Authentication => AppError::Decryption,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidKey(ref msg) => {
                tracing::error!("Invalid master key: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::InvalidPan(ref msg) => {
                tracing::debug!("Invalid PAN: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::TokenNotFound => {
                tracing::debug!("Token not found");
                (StatusCode::NOT_FOUND, "Token not found".to_string())
            }

            AppError::Storage(ref msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }

            AppError::Encryption => {
                tracing::error!("Encryption failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Encryption failed".to_string())
            }

            AppError::Decryption => {
                tracing::error!("Decryption failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Decryption failed".to_string())
            }

            AppError::Unauthorized => {
                tracing::warn!("Rejected admin request");
                (StatusCode::UNAUTHORIZED, "Invalid admin API key.".to_string())
            }

            AppError::Config(ref msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, [(http::header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
