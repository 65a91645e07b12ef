//! Configuration module for stride-tools.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets for common use cases
//! - YAML config file loading and discovery
//! - Layering: preset, then config file, then CLI flags
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use stride_tools::config::{AppConfig, ConfigPreset};
//!
//! // Use defaults
//! let config = AppConfig::default();
//!
//! // Use a preset
//! let config = AppConfig::from_preset(ConfigPreset::Legacy);
//!
//! // Use builder
//! let config = AppConfig::builder()
//!     .dos_rule(DosRuleVariant::ExcludePublicWeb)
//!     .fail_on_threats(true)
//!     .build();
//!
//! // Preset, then the discovered file, then flags
//! use stride_tools::config::file::load_or_default;
//! let (file, loaded_from) = load_or_default(None);
//! let flags = AppConfig::builder().dos_rule(DosRuleVariant::ApiOrWeb).into_overlay();
//! let config = AppConfig::layered(Some(ConfigPreset::Legacy), &[&file, &flags]);
//! ```
//!
//! # Configuration File
//!
//! Place a `.stride-tools.yaml` file in your project root or `~/.config/stride-tools/`:
//!
//! ```yaml
//! analysis:
//!   dos_rule: exclude-public-web
//! behavior:
//!   fail_on_threats: true
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

// Re-export main types
pub use defaults::{ConfigPreset, DEFAULT_DIAGRAM_TITLE, DEFAULT_GRAPHVIZ_BINARY};
pub use types::{
    AnalysisConfig, AnalysisOverlay, AnalyzeConfig, AnalyzeConfigBuilder, AppConfig,
    AppConfigBuilder, BehaviorConfig, BehaviorOverlay, ConfigOverlay, DiagramConfig,
    DiagramOverlay, OutputConfig, OutputOverlay, RulesPathConfig,
};
pub use validation::{ConfigError, Validatable};

// Re-export file utilities
pub use file::{
    default_config_path, discover_config_file, generate_example_config,
    generate_full_example_config, load_config_file, load_or_default, user_config_dir,
    ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.stride-tools.yaml` config files. It can be used by editors for
/// validation and autocompletion.
pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}
