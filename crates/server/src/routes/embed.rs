use axum::{body::Bytes, extract::State, Extension, Json};
use tracing::instrument;

use service::embed::{EmbedRequest, EmbedToken};

use crate::auth::BearerToken;
use crate::errors::ApiError;
use crate::state::ServerState;

/// Issue a signed Metabase embed URL for one dashboard category and tenant.
#[utoipa::path(
    post,
    path = "/functions/v1/metabase-embed",
    tag = "metabase",
    request_body = crate::openapi::EmbedRequestDoc,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Signed embed URL", body = crate::openapi::EmbedTokenDoc),
        (status = 400, description = "Missing parameter or unknown dashboard type", body = crate::errors::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 403, description = "Tenant belongs to another school", body = crate::errors::ErrorBody),
        (status = 500, description = "Server configuration error", body = crate::errors::ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn issue(
    State(state): State<ServerState>,
    Extension(token): Extension<BearerToken>,
    body: Bytes,
) -> Result<Json<EmbedToken>, ApiError> {
    let req: Option<EmbedRequest> = super::parse_body(&body)?;
    let embed = state.embed.issue(&token.0, &req.unwrap_or_default()).await?;
    Ok(Json(embed))
}
