//! Configuration validation for stride-tools.
//!
//! Provides validation traits and implementations for all configuration types.

use super::types::{
    AnalysisConfig, AnalyzeConfig, AppConfig, BehaviorConfig, DiagramConfig, OutputConfig,
    RulesPathConfig,
};
use crate::diagram::DiagramFormat;
use std::path::Path;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn check_parent_dir(field: &str, path: &Path, errors: &mut Vec<ConfigError>) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            errors.push(ConfigError::new(
                field,
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.analysis.validate());
        errors.extend(self.rules.validate());
        errors.extend(self.output.validate());
        errors.extend(self.diagram.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

impl Validatable for AnalysisConfig {
    fn validate(&self) -> Vec<ConfigError> {
        // every combination of switches yields a valid catalogue
        Vec::new()
    }
}

impl Validatable for RulesPathConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(path) = &self.path {
            if !path.exists() {
                errors.push(ConfigError::new(
                    "rules.path",
                    format!("Rules file not found: {}", path.display()),
                ));
            }
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(file_path) = &self.file {
            check_parent_dir("output.file", file_path, &mut errors);
        }
        errors
    }
}

impl Validatable for DiagramConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(file_path) = &self.file {
            check_parent_dir("diagram.file", file_path, &mut errors);
        }

        if let Some(format) = self.format.filter(DiagramFormat::needs_graphviz) {
            if self.graphviz_binary.trim().is_empty() {
                errors.push(ConfigError::new(
                    "diagram.graphviz_binary",
                    format!("A Graphviz executable is required for {format} output"),
                ));
            }
        }

        if self.title.trim().is_empty() {
            errors.push(ConfigError::new("diagram.title", "Diagram title must not be empty"));
        }

        errors
    }
}

impl Validatable for BehaviorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.quiet && self.explain {
            errors.push(ConfigError::new(
                "behavior.explain",
                "Contradictory behavior: 'explain' output is suppressed by 'quiet'",
            ));
        }
        errors
    }
}

impl Validatable for AnalyzeConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(model) = &self.model {
            if !model.exists() {
                errors.push(ConfigError::new(
                    "model",
                    format!("File not found: {}", model.display()),
                ));
            }
        }

        errors.extend(self.analysis.validate());
        errors.extend(self.rules.validate());
        errors.extend(self.output.validate());
        errors.extend(self.diagram.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_missing_paths() {
        let config = AppConfig::builder()
            .rules_file(Some(PathBuf::from("/nonexistent/rules.yaml")))
            .output_file(Some(PathBuf::from("/nonexistent/dir/report.json")))
            .build();
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["rules.path", "output.file"]);
    }

    #[test]
    fn test_diagram_validation() {
        let config = DiagramConfig {
            format: Some(DiagramFormat::Png),
            graphviz_binary: " ".to_string(),
            title: String::new(),
            ..DiagramConfig::default()
        };
        assert_eq!(config.validate().len(), 2);
    }

    #[test]
    fn test_quiet_explain_conflict() {
        let behavior = BehaviorConfig {
            quiet: true,
            explain: true,
            ..BehaviorConfig::default()
        };
        let errors = behavior.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().starts_with("behavior.explain: "));
    }

    #[test]
    fn test_analyze_config_missing_model() {
        let config = AnalyzeConfig {
            model: Some(PathBuf::from("/nonexistent/model.yaml")),
            ..AnalyzeConfig::default()
        };
        assert!(!config.is_valid());
    }
}
