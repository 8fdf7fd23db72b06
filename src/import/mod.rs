//! @acp:module "Import"
//! @acp:summary "Import phase: reconciles an IR document into the documentation store"
//! @acp:domain import
//! @acp:layer service

pub mod importer;
pub mod repository;

pub use importer::{ImportStats, Importer};
pub use repository::Repository;
