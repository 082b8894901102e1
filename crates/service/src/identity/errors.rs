use thiserror::Error;

/// Failures while establishing who the caller is.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid or expired access token")]
    Unauthorized,
    #[error("identity provider not configured: {0}")]
    NotConfigured(String),
    #[error("identity provider unreachable: {0}")]
    Upstream(String),
}

impl IdentityError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            IdentityError::Unauthorized => 1004,
            IdentityError::NotConfigured(_) => 1301,
            IdentityError::Upstream(_) => 1302,
        }
    }
}
