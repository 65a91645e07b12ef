//! Default configurations and presets for stride-tools.
//!
//! Provides named presets for common use cases and default values.

use super::types::{AnalysisConfig, AppConfig, BehaviorConfig, OutputConfig};
use crate::reports::ReportFormat;
use crate::rules::DosRuleVariant;

/// Default Graphviz executable.
pub const DEFAULT_GRAPHVIZ_BINARY: &str = "dot";

/// Default diagram title.
pub const DEFAULT_DIAGRAM_TITLE: &str = "Data Flow Diagram";

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Built-in catalogue with the public-facing overlay
    Default,
    /// Everything on: overlay plus spoofing on "frontend" boundaries
    Extended,
    /// The minimal rule set: no overlay, DoS skipped for public web apps
    Legacy,
    /// CI/CD: JSON output, fail when threats are found
    CiCd,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Extended => "extended",
            Self::Legacy => "legacy",
            Self::CiCd => "ci-cd",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "balanced" => Some(Self::Default),
            "extended" | "full" => Some(Self::Extended),
            "legacy" | "minimal" => Some(Self::Legacy),
            "ci-cd" | "ci" | "pipeline" => Some(Self::CiCd),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Built-in STRIDE catalogue with the public-facing overlay",
            Self::Extended => "All optional rules, including spoofing on frontend boundaries",
            Self::Legacy => "Core rules only; DoS rule excludes public-facing web applications",
            Self::CiCd => "JSON output that fails the build when threats are identified",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Extended, Self::Legacy, Self::CiCd]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::Extended => Self::extended_preset(),
            ConfigPreset::Legacy => Self::legacy_preset(),
            ConfigPreset::CiCd => Self::ci_cd_preset(),
        }
    }

    #[must_use]
    pub fn extended_preset() -> Self {
        Self {
            analysis: AnalysisConfig {
                public_facing_overlay: true,
                boundary_frontend_spoofing: true,
                ..AnalysisConfig::default()
            },
            ..Self::default()
        }
    }

    /// Core catalogue only.
    ///
    /// - No `PUB-*` overlay rules
    /// - DoS gated on `api OR (web AND NOT public_facing)`
    #[must_use]
    pub fn legacy_preset() -> Self {
        Self {
            analysis: AnalysisConfig {
                public_facing_overlay: false,
                boundary_frontend_spoofing: false,
                dos_rule: DosRuleVariant::ExcludePublicWeb,
                diagram_stage: true,
            },
            ..Self::default()
        }
    }

    /// CI/CD preset.
    ///
    /// - JSON output without colors
    /// - Exit code 1 when any threat is found
    #[must_use]
    pub fn ci_cd_preset() -> Self {
        Self {
            output: OutputConfig {
                format: ReportFormat::Json,
                file: None,
                no_color: true,
            },
            behavior: BehaviorConfig {
                fail_on_threats: true,
                quiet: true,
                explain: false,
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_names_roundtrip() {
        for preset in ConfigPreset::all() {
            assert_eq!(ConfigPreset::from_name(preset.name()), Some(*preset));
        }
        assert_eq!(ConfigPreset::from_name("CI"), Some(ConfigPreset::CiCd));
        assert_eq!(ConfigPreset::from_name("unknown"), None);
    }

    #[test]
    fn test_presets_differ() {
        let legacy = AppConfig::from_preset(ConfigPreset::Legacy);
        assert!(!legacy.analysis.public_facing_overlay);
        assert_eq!(legacy.analysis.dos_rule, DosRuleVariant::ExcludePublicWeb);

        let extended = AppConfig::from_preset(ConfigPreset::Extended);
        assert!(extended.analysis.boundary_frontend_spoofing);

        let ci = AppConfig::from_preset(ConfigPreset::CiCd);
        assert_eq!(ci.output.format, ReportFormat::Json);
        assert!(ci.behavior.fail_on_threats);
        assert_eq!(AppConfig::from_preset(ConfigPreset::Default), AppConfig::default());
    }
}
