//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Each command is in its own submodule.

pub mod dashboard;
pub mod import;
pub mod migrate;
pub mod parse;
pub mod software;

pub use dashboard::{execute_dashboard, DashboardOptions};
pub use import::{execute_import, ImportOptions};
pub use migrate::{execute_migrate, MigrateOptions};
pub use parse::{execute_parse, ParseOptions};
pub use software::{execute_add_software, execute_add_version, AddSoftwareOptions, AddVersionOptions};
