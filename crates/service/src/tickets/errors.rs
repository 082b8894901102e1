use thiserror::Error;

use crate::directory::DirectoryError;
use crate::identity::IdentityError;

/// Failures talking to the helpdesk API.
#[derive(Debug, Error)]
pub enum HelpdeskError {
    #[error("helpdesk not configured: {0}")]
    NotConfigured(&'static str),
    #[error("helpdesk returned status {status}")]
    Upstream { status: u16, body: String },
    #[error("helpdesk unreachable: {0}")]
    Transport(String),
    #[error("unexpected helpdesk payload: {0}")]
    Decode(String),
}

impl HelpdeskError {
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            HelpdeskError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Every way a ticket request can fail. Degraded results are not errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("invalid action: {0:?}")]
    InvalidAction(String),
    #[error("tenant configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Helpdesk(#[from] HelpdeskError),
}

impl GatewayError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            GatewayError::Identity(e) => e.code(),
            GatewayError::Directory(e) => e.code(),
            GatewayError::MissingParameter(_) => 3001,
            GatewayError::InvalidParameter(_) => 3002,
            GatewayError::InvalidAction(_) => 3003,
            GatewayError::Configuration(_) => 3101,
            GatewayError::Helpdesk(HelpdeskError::NotConfigured(_)) => 3102,
            GatewayError::Helpdesk(HelpdeskError::Upstream { .. }) => 3201,
            GatewayError::Helpdesk(HelpdeskError::Transport(_)) => 3202,
            GatewayError::Helpdesk(HelpdeskError::Decode(_)) => 3203,
        }
    }
}
