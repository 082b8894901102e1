use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use service::embed::EmbedError;
use service::identity::IdentityError;
use service::tickets::{GatewayError, HelpdeskError};

const CONFIGURATION_ERROR: &str = "server configuration error";

/// JSON error body returned by every function route.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, body: ErrorBody { error: error.into(), upstream_status: None, details: None } }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    fn configuration(code: u16, detail: &dyn std::fmt::Display) -> Self {
        error!(code, detail = %detail, "configuration error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, CONFIGURATION_ERROR)
    }

    fn internal(code: u16, error: impl Into<String>, details: Option<String>) -> Self {
        let mut e = Self::new(StatusCode::INTERNAL_SERVER_ERROR, error);
        error!(code, error = %e.body.error, "request failed");
        e.body.details = details;
        e
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Unauthorized => ApiError::unauthorized(),
            IdentityError::NotConfigured(_) => ApiError::configuration(e.code(), &e),
            IdentityError::Upstream(ref msg) => {
                ApiError::internal(e.code(), "identity provider unavailable", Some(msg.clone()))
            }
        }
    }
}

impl From<EmbedError> for ApiError {
    fn from(e: EmbedError) -> Self {
        match e {
            EmbedError::MissingParameter(_) | EmbedError::UnknownDashboardCategory(_) => {
                ApiError::bad_request(e.to_string())
            }
            EmbedError::Configuration(_) => ApiError::configuration(e.code(), &e),
            EmbedError::Signing(_) => ApiError::internal(e.code(), "failed to sign embed token", None),
            EmbedError::TenantNotAllowed(_) => ApiError::new(StatusCode::FORBIDDEN, e.to_string()),
            EmbedError::Identity(inner) => inner.into(),
            EmbedError::Directory(ref inner) => {
                ApiError::internal(e.code(), "failed to resolve tenant scope", Some(inner.to_string()))
            }
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        let code = e.code();
        match e {
            GatewayError::Identity(inner) => inner.into(),
            GatewayError::MissingParameter(_)
            | GatewayError::InvalidParameter(_)
            | GatewayError::InvalidAction(_) => ApiError::bad_request(e.to_string()),
            GatewayError::Configuration(_) | GatewayError::Helpdesk(HelpdeskError::NotConfigured(_)) => {
                ApiError::configuration(code, &e)
            }
            GatewayError::Directory(inner) => {
                ApiError::internal(code, "failed to resolve tenant scope", Some(inner.to_string()))
            }
            GatewayError::Helpdesk(HelpdeskError::Upstream { status, body }) => {
                let mut err = ApiError::internal(code, "helpdesk request failed", Some(body));
                err.body.upstream_status = Some(status);
                err
            }
            GatewayError::Helpdesk(HelpdeskError::Transport(msg)) => {
                ApiError::internal(code, "helpdesk unreachable", Some(msg))
            }
            GatewayError::Helpdesk(HelpdeskError::Decode(msg)) => {
                ApiError::internal(code, "unexpected helpdesk response", Some(msg))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failure_carries_status_and_details() {
        let e: ApiError = GatewayError::Helpdesk(HelpdeskError::Upstream { status: 422, body: "{\"error\":\"x\"}".into() }).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.body.upstream_status, Some(422));
        assert_eq!(e.body.details.as_deref(), Some("{\"error\":\"x\"}"));
    }

    #[test]
    fn configuration_errors_hide_detail() {
        let e: ApiError = EmbedError::Configuration("METABASE_SECRET_KEY is not set").into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.body.error, CONFIGURATION_ERROR);
        assert!(e.body.details.is_none());
    }

    #[test]
    fn foreign_tenant_is_403() {
        let e: ApiError = EmbedError::TenantNotAllowed("9999".into()).into();
        assert_eq!(e.status, StatusCode::FORBIDDEN);
        let e: ApiError = EmbedError::Identity(IdentityError::Unauthorized).into();
        assert_eq!(e.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn request_errors_map_to_400_and_401() {
        let e: ApiError = GatewayError::InvalidAction("drop".into()).into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        let e: ApiError = GatewayError::Identity(IdentityError::Unauthorized).into();
        assert_eq!(e.status, StatusCode::UNAUTHORIZED);
        assert_eq!(e.body.error, "Unauthorized");
    }
}
