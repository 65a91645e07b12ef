//! Pipeline orchestration for threat-model runs.
//!
//! This module provides the load → analyze → report → diagram stages used
//! by the CLI command handlers.

mod analyze_stage;
mod diagram_stage;
mod load;
mod output;
mod report_stage;

pub use analyze_stage::{build_engine, explain_features, load_rule_table};
pub use diagram_stage::{output_diagram, resolve_diagram_format};
pub use load::{load_input, LoadedInput};
pub use output::{auto_detect_format, should_use_color, write_bytes, write_output, OutputTarget};
pub use report_stage::{build_report_config, output_report};

use crate::error::StrideError;

/// Structured pipeline error types for better diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The model file or inline flags were rejected
    #[error("Input rejected: {source}")]
    InputRejected {
        #[source]
        source: StrideError,
    },

    /// Failed to read a model file
    #[error("Load failed for {path}: {source}")]
    LoadFailed {
        path: String,
        #[source]
        source: StrideError,
    },

    /// Custom rules could not be loaded or compiled
    #[error("Rules failed: {source}")]
    RulesFailed {
        #[source]
        source: StrideError,
    },

    /// Report generation or output failed
    #[error("Report failed: {source}")]
    ReportFailed {
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    /// Exit code the binary should use for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InputRejected { .. } => exit_codes::INPUT_REJECTED,
            Self::LoadFailed { .. } | Self::RulesFailed { .. } | Self::ReportFailed { .. } => {
                exit_codes::ERROR
            }
        }
    }
}

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success (no threats, or threats without --fail-on-threats)
    pub const SUCCESS: i32 = 0;
    /// Threats were identified and --fail-on-threats was given
    pub const THREATS_FOUND: i32 = 1;
    /// The input was rejected before analysis
    pub const INPUT_REJECTED: i32 = 2;
    /// An error occurred
    pub const ERROR: i32 = 3;
}
