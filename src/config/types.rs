//! Configuration types for stride-tools operations.
//!
//! Provides structured configuration for the analyze command and the
//! persisted settings it reads from config files.

use super::defaults::{ConfigPreset, DEFAULT_DIAGRAM_TITLE, DEFAULT_GRAPHVIZ_BINARY};
use crate::analysis::EngineOptions;
use crate::diagram::DiagramFormat;
use crate::parsers::InputOverrides;
use crate::reports::ReportFormat;
use crate::rules::{CatalogOptions, DosRuleVariant};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// Aggregates every persisted option. It can be constructed from CLI
/// arguments, config files, or both (with CLI overriding file settings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Rule catalogue and engine switches
    pub analysis: AnalysisConfig,
    /// Custom rules file
    pub rules: RulesPathConfig,
    /// Report output (format, file, colors)
    pub output: OutputConfig,
    /// Data-flow diagram output
    pub diagram: DiagramConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Sparse Configuration Layers
// ============================================================================

/// One layer of settings on top of an `AppConfig`: a config file or the
/// command-line flags.
///
/// `None` leaves the value below untouched, so a later layer can restore
/// a default that an earlier layer (or a preset) changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigOverlay {
    pub analysis: AnalysisOverlay,
    pub rules: RulesPathConfig,
    pub output: OutputOverlay,
    pub diagram: DiagramOverlay,
    pub behavior: BehaviorOverlay,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalysisOverlay {
    pub public_facing_overlay: Option<bool>,
    pub boundary_frontend_spoofing: Option<bool>,
    pub dos_rule: Option<DosRuleVariant>,
    pub diagram_stage: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputOverlay {
    pub format: Option<ReportFormat>,
    pub file: Option<PathBuf>,
    pub no_color: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiagramOverlay {
    pub format: Option<DiagramFormat>,
    pub file: Option<PathBuf>,
    pub graphviz_binary: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BehaviorOverlay {
    pub fail_on_threats: Option<bool>,
    pub quiet: Option<bool>,
    pub explain: Option<bool>,
}

fn overwrite<T: Clone>(target: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}

fn overwrite_some<T: Clone>(target: &mut Option<T>, value: Option<&T>) {
    if let Some(value) = value {
        *target = Some(value.clone());
    }
}

impl AppConfig {
    /// Apply a layer on top of this config. Every value the layer sets
    /// wins, including one equal to the default.
    pub fn apply(&mut self, layer: &ConfigOverlay) {
        let analysis = &layer.analysis;
        overwrite(&mut self.analysis.public_facing_overlay, analysis.public_facing_overlay.as_ref());
        overwrite(
            &mut self.analysis.boundary_frontend_spoofing,
            analysis.boundary_frontend_spoofing.as_ref(),
        );
        overwrite(&mut self.analysis.dos_rule, analysis.dos_rule.as_ref());
        overwrite(&mut self.analysis.diagram_stage, analysis.diagram_stage.as_ref());

        overwrite_some(&mut self.rules.path, layer.rules.path.as_ref());

        let output = &layer.output;
        overwrite(&mut self.output.format, output.format.as_ref());
        overwrite_some(&mut self.output.file, output.file.as_ref());
        overwrite(&mut self.output.no_color, output.no_color.as_ref());

        let diagram = &layer.diagram;
        overwrite_some(&mut self.diagram.format, diagram.format.as_ref());
        overwrite_some(&mut self.diagram.file, diagram.file.as_ref());
        overwrite(&mut self.diagram.graphviz_binary, diagram.graphviz_binary.as_ref());
        overwrite(&mut self.diagram.title, diagram.title.as_ref());

        let behavior = &layer.behavior;
        overwrite(&mut self.behavior.fail_on_threats, behavior.fail_on_threats.as_ref());
        overwrite(&mut self.behavior.quiet, behavior.quiet.as_ref());
        overwrite(&mut self.behavior.explain, behavior.explain.as_ref());
    }

    /// Effective settings: the preset (or the defaults), then each layer
    /// in order.
    #[must_use]
    pub fn layered(preset: Option<ConfigPreset>, layers: &[&ConfigOverlay]) -> Self {
        let mut config = preset.map_or_else(Self::default, Self::from_preset);
        for layer in layers {
            config.apply(layer);
        }
        config
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for a configuration layer with a fluent API.
///
/// Only the values that are set end up in the layer.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    layer: ConfigOverlay,
}

impl AppConfigBuilder {
    /// Select the DoS system rule variant.
    pub const fn dos_rule(mut self, variant: DosRuleVariant) -> Self {
        self.layer.analysis.dos_rule = Some(variant);
        self
    }

    /// Toggle the public-facing overlay rules.
    pub const fn public_facing_overlay(mut self, enabled: bool) -> Self {
        self.layer.analysis.public_facing_overlay = Some(enabled);
        self
    }

    /// Toggle spoofing on "frontend" boundaries.
    pub const fn boundary_frontend_spoofing(mut self, enabled: bool) -> Self {
        self.layer.analysis.boundary_frontend_spoofing = Some(enabled);
        self
    }

    /// Toggle the diagram-component stage.
    pub const fn diagram_stage(mut self, enabled: bool) -> Self {
        self.layer.analysis.diagram_stage = Some(enabled);
        self
    }

    /// Set the custom rules file.
    pub fn rules_file(mut self, path: Option<PathBuf>) -> Self {
        self.layer.rules.path = path;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.layer.output.format = Some(format);
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.layer.output.file = file;
        self
    }

    /// Disable colored output.
    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.layer.output.no_color = Some(no_color);
        self
    }

    /// Set the diagram format.
    pub const fn diagram_format(mut self, format: DiagramFormat) -> Self {
        self.layer.diagram.format = Some(format);
        self
    }

    /// Set the diagram output file.
    pub fn diagram_file(mut self, file: Option<PathBuf>) -> Self {
        self.layer.diagram.file = file;
        self
    }

    /// Set the Graphviz executable.
    pub fn graphviz_binary(mut self, binary: impl Into<String>) -> Self {
        self.layer.diagram.graphviz_binary = Some(binary.into());
        self
    }

    /// Exit with a distinct code when threats are found.
    pub const fn fail_on_threats(mut self, fail: bool) -> Self {
        self.layer.behavior.fail_on_threats = Some(fail);
        self
    }

    /// Enable quiet mode.
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.layer.behavior.quiet = Some(quiet);
        self
    }

    /// Print feature evidence before the report.
    pub const fn explain(mut self, explain: bool) -> Self {
        self.layer.behavior.explain = Some(explain);
        self
    }

    /// The layer holding only what was set.
    #[must_use]
    pub fn into_overlay(self) -> ConfigOverlay {
        self.layer
    }

    /// Build the `AppConfig`: the defaults with this layer applied.
    #[must_use]
    pub fn build(self) -> AppConfig {
        let mut config = AppConfig::default();
        config.apply(&self.layer);
        config
    }
}

// ============================================================================
// Command-specific Configuration Types
// ============================================================================

/// Configuration for analyze operations
#[derive(Debug, Clone, Default)]
pub struct AnalyzeConfig {
    /// Threat-model file (None when the model comes from flags only)
    pub model: Option<PathBuf>,
    /// Command-line additions to the model
    pub overrides: InputOverrides,
    pub analysis: AnalysisConfig,
    pub rules: RulesPathConfig,
    pub output: OutputConfig,
    pub diagram: DiagramConfig,
    pub behavior: BehaviorConfig,
}

impl AnalyzeConfig {
    /// Analyze configuration seeded from persisted settings.
    #[must_use]
    pub fn from_app(app: &AppConfig) -> Self {
        Self {
            model: None,
            overrides: InputOverrides::default(),
            analysis: app.analysis.clone(),
            rules: app.rules.clone(),
            output: app.output.clone(),
            diagram: app.diagram.clone(),
            behavior: app.behavior.clone(),
        }
    }

    /// Create an `AnalyzeConfig` builder.
    pub fn builder() -> AnalyzeConfigBuilder {
        AnalyzeConfigBuilder::default()
    }
}

// ============================================================================
// Configuration Sections
// ============================================================================

/// Rule catalogue and engine switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Append the PUB-* system rules for public-facing systems
    pub public_facing_overlay: bool,
    /// Also raise boundary spoofing for boundaries named "frontend"
    pub boundary_frontend_spoofing: bool,
    /// Gating of the system-level denial-of-service rule
    pub dos_rule: DosRuleVariant,
    /// Run the diagram-component stage when a diagram is supplied
    pub diagram_stage: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let catalog = CatalogOptions::default();
        Self {
            public_facing_overlay: catalog.public_facing_overlay,
            boundary_frontend_spoofing: catalog.boundary_frontend_spoofing,
            dos_rule: catalog.dos_rule,
            diagram_stage: true,
        }
    }
}

impl AnalysisConfig {
    /// Catalogue switches for building the rule table.
    #[must_use]
    pub const fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            public_facing_overlay: self.public_facing_overlay,
            boundary_frontend_spoofing: self.boundary_frontend_spoofing,
            dos_rule: self.dos_rule,
        }
    }

    #[must_use]
    pub const fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            catalog: self.catalog_options(),
            diagram_stage: self.diagram_stage,
        }
    }
}

/// Custom rules file configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RulesPathConfig {
    /// Path to a YAML file with extra keywords, rules and disabled rule ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Disable colored output
    pub no_color: bool,
}

/// Data-flow diagram configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DiagramConfig {
    /// Diagram format (None infers it from the file extension, ASCII otherwise)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DiagramFormat>,
    /// Diagram output path (None disables diagram output)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Graphviz executable used for PNG and SVG
    pub graphviz_binary: String,
    /// Title printed on the diagram
    pub title: String,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            format: None,
            file: None,
            graphviz_binary: DEFAULT_GRAPHVIZ_BINARY.to_string(),
            title: DEFAULT_DIAGRAM_TITLE.to_string(),
        }
    }
}

/// Behavior flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Exit with code 1 if any threat is identified
    pub fail_on_threats: bool,
    /// Suppress non-essential output
    pub quiet: bool,
    /// Print the keyword behind each detected feature
    pub explain: bool,
}

// ============================================================================
// Builder for AnalyzeConfig
// ============================================================================

/// Builder for `AnalyzeConfig`
#[derive(Debug, Default)]
#[must_use]
pub struct AnalyzeConfigBuilder {
    config: AnalyzeConfig,
}

impl AnalyzeConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from persisted settings.
    pub fn from_app(app: &AppConfig) -> Self {
        Self {
            config: AnalyzeConfig::from_app(app),
        }
    }

    pub fn model(mut self, path: Option<PathBuf>) -> Self {
        self.config.model = path;
        self
    }

    pub fn overrides(mut self, overrides: InputOverrides) -> Self {
        self.config.overrides = overrides;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config.overrides.description = Some(description.into());
        self
    }

    pub fn flow(mut self, flow: impl Into<String>) -> Self {
        self.config.overrides.flows.push(flow.into());
        self
    }

    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.config.overrides.boundaries.push(boundary.into());
        self
    }

    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.config.output.no_color = no_color;
        self
    }

    pub fn rules_file(mut self, path: Option<PathBuf>) -> Self {
        self.config.rules.path = path;
        self
    }

    pub const fn dos_rule(mut self, variant: DosRuleVariant) -> Self {
        self.config.analysis.dos_rule = variant;
        self
    }

    pub fn diagram_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.diagram.file = file;
        self
    }

    pub const fn diagram_format(mut self, format: DiagramFormat) -> Self {
        self.config.diagram.format = Some(format);
        self
    }

    pub fn graphviz_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.diagram.graphviz_binary = binary.into();
        self
    }

    pub const fn fail_on_threats(mut self, fail: bool) -> Self {
        self.config.behavior.fail_on_threats = fail;
        self
    }

    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.config.behavior.quiet = quiet;
        self
    }

    pub const fn explain(mut self, explain: bool) -> Self {
        self.config.behavior.explain = explain;
        self
    }

    /// Build the config. At least a model file or an inline description
    /// or diagram is required.
    pub fn build(self) -> anyhow::Result<AnalyzeConfig> {
        let overrides = &self.config.overrides;
        if self.config.model.is_none() && overrides.description.is_none() && overrides.diagram.is_none() {
            anyhow::bail!("a model file, --description or --diagram is required");
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert!(config.analysis.public_facing_overlay);
        assert!(!config.analysis.boundary_frontend_spoofing);
        assert_eq!(config.analysis.dos_rule, DosRuleVariant::ApiOrWeb);
        assert!(config.analysis.diagram_stage);
        assert_eq!(config.diagram.graphviz_binary, "dot");
        assert_eq!(config.output.format, ReportFormat::Auto);
    }

    #[test]
    fn test_engine_options_follow_analysis() {
        let config = AppConfig::builder()
            .dos_rule(DosRuleVariant::ExcludePublicWeb)
            .diagram_stage(false)
            .build();
        let options = config.analysis.engine_options();
        assert_eq!(options.catalog.dos_rule, DosRuleVariant::ExcludePublicWeb);
        assert!(!options.diagram_stage);
    }

    #[test]
    fn test_analyze_builder_requires_input() {
        assert!(AnalyzeConfigBuilder::new().build().is_err());
        let config = AnalyzeConfigBuilder::new()
            .description("login api")
            .flow("User,API,PII")
            .fail_on_threats(true)
            .build()
            .unwrap();
        assert_eq!(config.overrides.flows, vec!["User,API,PII"]);
        assert!(config.behavior.fail_on_threats);
    }

    #[test]
    fn test_explicit_default_overrides_legacy_preset() {
        let flags = AppConfig::builder().dos_rule(DosRuleVariant::ApiOrWeb).into_overlay();
        let config = AppConfig::layered(Some(ConfigPreset::Legacy), &[&ConfigOverlay::default(), &flags]);
        assert_eq!(config.analysis.dos_rule, DosRuleVariant::ApiOrWeb);
        assert!(!config.analysis.public_facing_overlay);
    }

    #[test]
    fn test_file_layer_restores_defaults() {
        let file: ConfigOverlay = serde_yaml::from_str(
            "analysis:\n  public_facing_overlay: true\n  boundary_frontend_spoofing: false\n",
        )
        .unwrap();

        let legacy = AppConfig::layered(Some(ConfigPreset::Legacy), &[&file]);
        assert!(legacy.analysis.public_facing_overlay);
        assert_eq!(legacy.analysis.dos_rule, DosRuleVariant::ExcludePublicWeb);

        let extended = AppConfig::layered(Some(ConfigPreset::Extended), &[&file]);
        assert!(!extended.analysis.boundary_frontend_spoofing);
    }

    #[test]
    fn test_unset_layer_values_keep_lower_layers() {
        let file = AppConfig::builder()
            .fail_on_threats(true)
            .diagram_format(DiagramFormat::Svg)
            .into_overlay();
        let flags = AppConfig::builder().quiet(true).into_overlay();
        let config = AppConfig::layered(None, &[&file, &flags]);
        assert!(config.behavior.fail_on_threats);
        assert!(config.behavior.quiet);
        assert_eq!(config.diagram.format, Some(DiagramFormat::Svg));
        assert_eq!(config.diagram.graphviz_binary, "dot");
    }

    #[test]
    fn test_yaml_partial_sections() {
        let config: AppConfig =
            serde_yaml::from_str("analysis:\n  dos_rule: exclude-public-web\n").unwrap();
        assert_eq!(config.analysis.dos_rule, DosRuleVariant::ExcludePublicWeb);
        assert!(config.analysis.public_facing_overlay);
        assert_eq!(config.diagram, DiagramConfig::default());
    }
}
