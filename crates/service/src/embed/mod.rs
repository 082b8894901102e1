//! Metabase signed-embed issuance: one dashboard, one tenant, short-lived token.

pub mod access;
pub mod domain;
pub mod errors;
pub mod service;

pub use domain::{DashboardCategory, EmbedClaims, EmbedRequest, EmbedToken};
pub use access::EmbedService;
pub use errors::EmbedError;
pub use service::EmbedTokenIssuer;
