use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::{error::AppError, state::AppState};

/// The header that carries the admin API key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-api-key";

/// Marker inserted into request extensions once the admin key checked out.
#[derive(Clone, Copy, Debug)]
pub struct Privileged;

/// Compares the supplied key against the configured one in constant time.
fn is_admin_key(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(ADMIN_KEY_HEADER)
        .map(|supplied| bool::from(supplied.as_bytes().ct_eq(expected.as_bytes())))
        .unwrap_or(false)
}

/// A middleware that requires a valid admin API key.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response` or [`AppError::Unauthorized`].
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !is_admin_key(request.headers(), state.admin_api_key.as_str()) {
        return Err(AppError::Unauthorized);
    }

    tracing::debug!("🔐 Admin key accepted");
    request.extensions_mut().insert(Privileged);

    Ok(next.run(request).await)
}
