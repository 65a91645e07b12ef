//! **A STRIDE threat-modeling inference engine.**
//!
//! `stride-tools` turns a lightweight description of a system into a
//! numbered list of STRIDE threats (Spoofing, Tampering, Repudiation,
//! Information Disclosure, Denial of Service, Elevation of Privilege), each
//! with a mitigation and references to OWASP ASVS and SAMM.
//!
//! The input is intentionally small: a free-text description, a list of
//! data flows, a list of trust boundaries and optionally an architecture
//! diagram. No real parsing of the system happens; the engine relies on
//! keyword detection and a declarative rule catalogue, so results are a
//! starting checklist rather than an audit.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the input ([`AnalysisInput`], [`DataFlow`], [`TrustBoundary`])
//!   and the output ([`Threat`], [`ThreatModel`]).
//! - **[`rules`]**: the built-in rule catalogue and YAML custom rules.
//! - **[`analysis`]**: the [`ThreatEngine`], which runs feature detection and the
//!   system, flow, boundary and diagram stages in a fixed order.
//! - **[`parsers`]**: YAML/JSON threat-model documents and inline flag values.
//! - **[`reports`]**: summary, table, JSON, Markdown, SARIF and CSV generators.
//! - **[`diagram`]**: annotated data-flow diagrams (ASCII, DOT, PNG, SVG).
//! - **[`pipeline`]** and **[`cli`]**: the stages behind the command-line tool.
//!
//! ## Getting Started
//!
//! ```
//! use stride_tools::{analyze, AnalysisInput, DataFlow, StrideCategory, TrustBoundary};
//!
//! let input = AnalysisInput::new("Public web app with login backed by a Postgres database")
//!     .with_flow(DataFlow::new("Browser", "API", "credentials"))
//!     .with_boundary(TrustBoundary::new("DMZ", "browser api"));
//!
//! let model = analyze(&input);
//! assert!(!model.is_empty());
//!
//! for threat in &model.threats {
//!     println!("{} [{}] {}: {}", threat.id, threat.dfd_element, threat.category, threat.description);
//! }
//! assert!(model.threats.iter().any(|t| t.category == StrideCategory::Tampering));
//! ```
//!
//! ### Loading a model file
//!
//! ```no_run
//! use std::path::Path;
//! use stride_tools::{parse_model, ThreatEngine};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input = parse_model(Path::new("threat-model.yaml"))?;
//!     let model = ThreatEngine::default().analyze(&input);
//!     println!("{} threat(s)", model.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! This documentation is for the `stride-tools` library crate. The binary
//! exposes the same engine through `stride-tools analyze`; see the README.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::similar_names
)]

pub mod analysis;
pub mod cli;
pub mod config;
pub mod diagram;
pub mod error;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod reports;
pub mod rules;

// Re-export main types for convenience
pub use analysis::{analyze, EngineOptions, ThreatEngine};
pub use config::{
    AnalysisConfig, AnalyzeConfig, AppConfig, AppConfigBuilder, BehaviorConfig, ConfigError,
    ConfigOverlay, ConfigPreset, DiagramConfig, OutputConfig, Validatable,
};
pub use diagram::DiagramFormat;
pub use error::{Result, StrideError};
pub use model::{
    AnalysisInput, DataFlow, DiagramRef, Feature, FeatureSet, StrideCategory, Threat, ThreatId,
    ThreatModel, TrustBoundary,
};
pub use parsers::{parse_model, parse_model_str};
pub use reports::{ReportFormat, ReportGenerator};
pub use rules::{CustomRulesConfig, DosRuleVariant, RuleTable};
