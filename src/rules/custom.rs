//! Custom rule files.
//!
//! A YAML rules file extends the built-in catalogue:
//!
//! ```yaml
//! disabled: [PUB-I-001]
//! keywords:
//!   database: [postgres, mongodb]
//! system:
//!   - id: ORG-R-001
//!     category: Repudiation
//!     when: { all: [cloud, authentication] }
//!     description: Federated logins may not be attributable to a person.
//!     mitigation: Correlate identity-provider logs with application audit logs.
//! flows:
//!   - id: ORG-I-001
//!     category: Information Disclosure
//!     when: { field: data_type, matches: "card|pan" }
//!     description: Cardholder data ({data_type}) crosses {source} to {destination}.
//!     mitigation: Tokenize card numbers before they leave the payment service.
//! ```

use super::condition::{ConditionSpec, TextConditionSpec};
use super::stage::{BoundaryField, FlowField};
use super::template::ThreatTemplate;
use crate::error::{Result, RuleErrorKind, StrideError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root of a custom rules file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomRulesConfig {
    /// Built-in rule ids to switch off
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Extra detector keywords, keyed by feature name
    #[serde(default)]
    pub keywords: IndexMap<String, Vec<String>>,

    #[serde(default)]
    pub system: Vec<CustomSystemRule>,

    #[serde(default)]
    pub flows: Vec<CustomFlowRule>,

    #[serde(default)]
    pub boundaries: Vec<CustomBoundaryRule>,

    /// Extra per-component rules for the diagram stage
    #[serde(default)]
    pub components: Vec<ThreatTemplate>,
}

/// System rule gated by a feature expression.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomSystemRule {
    pub when: ConditionSpec,
    #[serde(flatten)]
    pub template: ThreatTemplate,
}

/// Flow rule gated by a text condition on one flow field.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomFlowRule {
    pub when: TextConditionSpec<FlowField>,
    #[serde(flatten)]
    pub template: ThreatTemplate,
}

/// Boundary rule gated by a text condition on one boundary field.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomBoundaryRule {
    pub when: TextConditionSpec<BoundaryField>,
    #[serde(flatten)]
    pub template: ThreatTemplate,
}

impl CustomRulesConfig {
    /// Load rules from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            StrideError::rules("custom rules", RuleErrorKind::InvalidFile(e.to_string()))
        })
    }

    /// Load rules from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StrideError::io(path, e))?;
        Self::from_yaml(&content).map_err(|e| match e {
            StrideError::Rules { source, .. } => {
                StrideError::rules(format!("custom rules {}", path.display()), source)
            }
            other => other,
        })
    }

    /// Get summary statistics about the rules
    #[must_use]
    pub fn summary(&self) -> CustomRulesSummary {
        CustomRulesSummary {
            system_rules: self.system.len(),
            flow_rules: self.flows.len(),
            boundary_rules: self.boundaries.len(),
            component_rules: self.components.len(),
            extra_keywords: self.keywords.values().map(Vec::len).sum(),
            disabled: self.disabled.len(),
        }
    }

    /// Check if the file defines nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.disabled.is_empty()
            && self.keywords.is_empty()
            && self.system.is_empty()
            && self.flows.is_empty()
            && self.boundaries.is_empty()
            && self.components.is_empty()
    }
}

/// Summary of a custom rules file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomRulesSummary {
    pub system_rules: usize,
    pub flow_rules: usize,
    pub boundary_rules: usize,
    pub component_rules: usize,
    pub extra_keywords: usize,
    pub disabled: usize,
}

impl std::fmt::Display for CustomRulesSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} system, {} flow, {} boundary, {} component rule(s), {} extra keyword(s), {} disabled",
            self.system_rules,
            self.flow_rules,
            self.boundary_rules,
            self.component_rules,
            self.extra_keywords,
            self.disabled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StrideCategory;

    const SAMPLE: &str = r#"
disabled: [PUB-I-001]
keywords:
  database: [postgres]
  third_party: [vendor, saas]
system:
  - id: ORG-R-001
    category: Repudiation
    when: { all: [cloud, authentication] }
    description: Federated logins may not be attributable to a person.
    mitigation: Correlate identity-provider logs with application audit logs.
flows:
  - id: ORG-I-001
    category: Information Disclosure
    when: { field: data_type, matches: "card|pan" }
    description: "Cardholder data ({data_type}) crosses {source} to {destination}."
    mitigation: Tokenize card numbers before they leave the payment service.
    controls: Use a PCI-scoped tokenization vault.
    asvs: V8.3.1 - Verify sensitive data handling.
boundaries:
  - id: ORG-D-001
    category: Denial of Service
    when: { field: description, contains: [internet] }
    description: "{name} is reachable from the internet."
    mitigation: Rate limit ingress at the edge.
"#;

    #[test]
    fn test_parse_yaml_rules() {
        let config = CustomRulesConfig::from_yaml(SAMPLE).expect("Failed to parse YAML");
        assert_eq!(config.disabled, ["PUB-I-001"]);
        assert_eq!(config.system.len(), 1);
        assert_eq!(config.system[0].template.category, StrideCategory::Repudiation);
        assert_eq!(config.flows[0].template.controls.as_deref(), Some("Use a PCI-scoped tokenization vault."));
        assert!(matches!(
            config.flows[0].when,
            TextConditionSpec::Matches {
                field: FlowField::DataType,
                ..
            }
        ));
        assert_eq!(config.boundaries[0].template.samm, "");
    }

    #[test]
    fn test_summary() {
        let config = CustomRulesConfig::from_yaml(SAMPLE).unwrap();
        let summary = config.summary();
        assert_eq!(summary.extra_keywords, 3);
        assert_eq!(
            summary.to_string(),
            "1 system, 1 flow, 1 boundary, 0 component rule(s), 3 extra keyword(s), 1 disabled"
        );
    }

    #[test]
    fn test_empty_config() {
        let config = CustomRulesConfig::from_yaml("{}").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_invalid_yaml_is_rule_error() {
        let err = CustomRulesConfig::from_yaml("system: 12").unwrap_err();
        assert!(matches!(
            err,
            StrideError::Rules {
                source: RuleErrorKind::InvalidFile(_),
                ..
            }
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = CustomRulesConfig::from_file(&path).unwrap();
        assert_eq!(config.flows.len(), 1);

        let missing = CustomRulesConfig::from_file(&dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(StrideError::Io { .. })));
    }
}
