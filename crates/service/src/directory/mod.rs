//! Tenant directory: reads the caller's portal profile and the school's
//! mapping to external systems.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;

pub use domain::{Profile, TenantScope};
pub use errors::DirectoryError;
pub use repository::TenantDirectory;
