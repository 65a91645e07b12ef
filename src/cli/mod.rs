//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod analyze;
mod init;
mod rules;

pub use analyze::run_analyze;
pub use init::{run_init, InitConfig};
pub use rules::{run_rules, RulesConfig, RulesFormat};

// Re-export config types used by handlers
pub use crate::config::AnalyzeConfig;
