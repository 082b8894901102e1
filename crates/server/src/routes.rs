pub mod embed;
pub mod tickets;

use axum::{
    body::Bytes,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::auth::require_bearer_token;
use crate::errors::ApiError;
use crate::openapi::ApiDoc;
use crate::state::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> (StatusCode, String) {
    common::metrics::encode_metrics()
}

/// Decode a JSON request body. An empty body decodes as `null`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) { b"null" } else { body };
    serde_json::from_slice(raw).map_err(|e| {
        tracing::info!(err = %e, "malformed JSON body");
        ApiError::bad_request("invalid JSON body")
    })
}

/// Build the application router: public probes, docs and the two bearer-protected functions.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let functions = Router::new()
        .route("/functions/v1/metabase-embed", post(embed::issue))
        .route("/functions/v1/zendesk-tickets", post(tickets::relay))
        .route_layer(middleware::from_fn(require_bearer_token));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(functions)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
