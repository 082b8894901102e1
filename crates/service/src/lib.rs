//! Service layer for the Prime Hub functions.
//! - `embed`: Metabase signed-embed issuance.
//! - `tickets`: tenant-scoped Zendesk relay.
//! - `identity` / `directory`: who the caller is and which school they belong to.
//!
//! Web-framework independent; the `server` crate maps results onto HTTP.

pub mod directory;
pub mod embed;
pub mod http_client;
pub mod identity;
pub mod retry;
pub(crate) mod serde_util;
pub mod tickets;
