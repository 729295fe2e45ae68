use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{handlers, middleware_layer, state::AppState};

/// The largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Builds the HTTP router around the tokenization core.
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/decrypt", post(handlers::tokens::decrypt))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::admin::require_admin,
        ))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/", get(handlers::tokens::root))
        .route("/encrypt", post(handlers::tokens::encrypt))
        .route("/token/{token}", get(handlers::tokens::metadata))
        .route("/health", get(handlers::tokens::health))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::default())
                        .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                        .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
                )
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}
