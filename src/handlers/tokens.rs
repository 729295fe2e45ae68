use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    middleware_layer::admin::Privileged,
    state::AppState,
};

/// The request payload for tokenizing a PAN.
#[derive(Deserialize)]
pub struct EncryptRequest {
    pub pan: String,
}

/// The request payload for resolving a token to its PAN.
#[derive(Deserialize, Debug)]
pub struct DecryptRequest {
    pub token: String,
}

fn json_response(status: StatusCode, body: sonic_rs::Value) -> Response {
    let body = sonic_rs::to_string(&body)
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());
    (status, [(http::header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Describes the service.
pub async fn root() -> Response {
    json_response(
        StatusCode::OK,
        sonic_rs::json!({
            "service": "PAN Encryption & Tokenization Service",
            "endpoints": ["/encrypt", "/decrypt", "/token/{token}", "/health"]
        }),
    )
}

/// Tokenizes a PAN.
#[axum::debug_handler]
pub async fn encrypt(
    State(state): State<AppState>,
    Json(req): Json<EncryptRequest>,
) -> Result<Response> {
    let pan = zeroize::Zeroizing::new(req.pan);
    let result = state.vault.tokenize(&pan).await?;

    Ok(json_response(
        StatusCode::OK,
        sonic_rs::json!({
            "token": result.token,
            "masked_pan": result.masked_pan
        }),
    ))
}

/// Resolves a token to its clear PAN. Admin only.
#[axum::debug_handler]
pub async fn decrypt(
    State(state): State<AppState>,
    Extension(_): Extension<Privileged>,
    Json(req): Json<DecryptRequest>,
) -> Result<Response> {
    let result = state.vault.resolve(&req.token, true).await?;
    let pan = result.pan.ok_or(AppError::Decryption)?;

    Ok(json_response(
        StatusCode::OK,
        sonic_rs::json!({
            "pan": pan.as_str(),
            "masked_pan": result.masked_pan
        }),
    ))
}

/// Returns the masked PAN and issue time for a token.
#[axum::debug_handler]
pub async fn metadata(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response> {
    let result = state.vault.resolve(&token, false).await?;

    Ok(json_response(
        StatusCode::OK,
        sonic_rs::json!({
            "token": token,
            "masked_pan": result.masked_pan,
            "created_at": result.created_at.to_rfc3339()
        }),
    ))
}

/// Reports whether the record store is reachable.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.vault.store().ping().await {
        Ok(()) => json_response(StatusCode::OK, sonic_rs::json!({ "status": "ok" })),
        Err(e) => {
            tracing::error!("❌ Health check failed: {}", e);
            json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                sonic_rs::json!({ "status": "unavailable" }),
            )
        }
    }
}
