use axum::{body::Bytes, extract::State, Extension, Json};
use serde_json::Value;
use tracing::instrument;

use service::tickets::GatewayResponse;

use crate::auth::BearerToken;
use crate::errors::ApiError;
use crate::state::ServerState;

/// Relay one ticket action to the helpdesk, scoped to the caller's school.
#[utoipa::path(
    post,
    path = "/functions/v1/zendesk-tickets",
    tag = "zendesk",
    request_body = crate::openapi::TicketRequestDoc,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tickets, a created ticket, a single ticket, or a degraded result"),
        (status = 400, description = "Invalid action or parameter", body = crate::errors::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 500, description = "Configuration or upstream failure", body = crate::errors::ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn relay(
    State(state): State<ServerState>,
    Extension(token): Extension<BearerToken>,
    body: Bytes,
) -> Result<Json<GatewayResponse>, ApiError> {
    let body: Value = super::parse_body(&body)?;
    let response = state.tickets.handle(&token.0, &body).await?;
    Ok(Json(response))
}
