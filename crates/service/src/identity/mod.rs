//! Caller identity: bearer-token validation against the identity provider
//! and the per-request caller context built from it.

pub mod domain;
pub mod errors;
pub mod provider;
pub mod resolve;
pub mod supabase;

pub use domain::{AuthUser, CallerContext, Role};
pub use errors::IdentityError;
pub use provider::IdentityProvider;
pub use resolve::resolve_caller;
pub use supabase::SupabaseIdentityProvider;
