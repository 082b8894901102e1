use thiserror::Error;

use crate::directory::DirectoryError;
use crate::identity::IdentityError;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
    #[error("unknown dashboard type: {0}")]
    UnknownDashboardCategory(String),
    #[error("embedding not configured: {0}")]
    Configuration(&'static str),
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("tenant {0:?} is not accessible to this caller")]
    TenantNotAllowed(String),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl EmbedError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            EmbedError::MissingParameter(_) => 2001,
            EmbedError::UnknownDashboardCategory(_) => 2002,
            EmbedError::Configuration(_) => 2101,
            EmbedError::Signing(_) => 2102,
            EmbedError::TenantNotAllowed(_) => 2201,
            EmbedError::Identity(e) => e.code(),
            EmbedError::Directory(e) => e.code(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EmbedError::MissingParameter(_) => "missing_parameter",
            EmbedError::UnknownDashboardCategory(_) => "unknown_dashboard",
            EmbedError::Configuration(_) => "configuration",
            EmbedError::Signing(_) => "signing",
            EmbedError::TenantNotAllowed(_) => "tenant_not_allowed",
            EmbedError::Identity(_) => "identity",
            EmbedError::Directory(_) => "directory",
        }
    }
}
