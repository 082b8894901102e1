//! Read-only SeaORM entities over the portal tables the functions consult.
//! The schema itself is owned by the Supabase project; nothing here migrates it.

pub mod db;
pub mod errors;
pub mod profile;
pub mod school_customization;
