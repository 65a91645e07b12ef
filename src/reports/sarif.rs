//! SARIF 2.1.0 report generator for CI/CD integration.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::model::{AnalysisInput, StrideCategory, Threat, ThreatModel};
use indexmap::IndexMap;
use serde::Serialize;

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

/// SARIF report generator
pub struct SarifReporter {
    /// Include repudiation findings, which are reported as notes
    include_notes: bool,
}

impl SarifReporter {
    /// Create a new SARIF reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_notes: true,
        }
    }

    /// Set whether to include note-level results
    #[must_use]
    pub const fn include_notes(mut self, include: bool) -> Self {
        self.include_notes = include;
        self
    }
}

impl Default for SarifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SarifReporter {
    fn generate(
        &self,
        _input: &AnalysisInput,
        model: &ThreatModel,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let threats: Vec<&Threat> = model
            .threats
            .iter()
            .filter(|t| self.include_notes || category_to_level(t.category) != SarifLevel::Note)
            .collect();

        // one rule per catalogue rule that produced a result, in first-seen order
        let mut rules: IndexMap<&str, SarifRule> = IndexMap::new();
        for threat in &threats {
            rules
                .entry(threat.rule_id.as_str())
                .or_insert_with(|| threat_to_rule(threat));
        }

        let artifact = config.metadata.model_path.clone();
        let results = threats
            .iter()
            .map(|t| threat_to_result(t, artifact.as_deref()))
            .collect();

        let sarif = SarifReport {
            schema: SARIF_SCHEMA.to_string(),
            version: "2.1.0".to_string(),
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: env!("CARGO_PKG_NAME").to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                        rules: rules.into_values().collect(),
                    },
                },
                results,
            }],
        };

        serde_json::to_string_pretty(&sarif)
            .map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Sarif
    }
}

const fn category_to_level(category: StrideCategory) -> SarifLevel {
    match category {
        StrideCategory::Spoofing | StrideCategory::Tampering | StrideCategory::ElevationOfPrivilege => {
            SarifLevel::Error
        }
        StrideCategory::InformationDisclosure | StrideCategory::DenialOfService => SarifLevel::Warning,
        StrideCategory::Repudiation => SarifLevel::Note,
    }
}

fn threat_to_rule(threat: &Threat) -> SarifRule {
    SarifRule {
        id: threat.rule_id.clone(),
        name: threat.category.name().replace(' ', ""),
        short_description: SarifMessage {
            text: format!("{} threat", threat.category),
        },
        help: SarifMessage {
            text: threat.mitigation.clone(),
        },
        properties: SarifRuleProperties {
            stride: threat.category.code().to_string(),
            asvs: threat.asvs.clone(),
            samm: threat.samm.clone(),
        },
        default_configuration: SarifConfiguration {
            level: category_to_level(threat.category),
        },
    }
}

fn threat_to_result(threat: &Threat, artifact: Option<&str>) -> SarifResult {
    SarifResult {
        rule_id: threat.rule_id.clone(),
        level: category_to_level(threat.category),
        message: SarifMessage {
            text: format!("{} ({}): {}", threat.id, threat.category, threat.description),
        },
        locations: vec![SarifLocation {
            physical_location: artifact.map(|uri| SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: uri.to_string(),
                },
            }),
            logical_locations: vec![SarifLogicalLocation {
                name: threat.dfd_element.clone(),
                kind: if crate::diagram::is_edge(&threat.dfd_element) {
                    "dataFlow"
                } else {
                    "element"
                },
            }],
        }],
        partial_fingerprints: SarifFingerprints {
            threat_id: threat.id.to_string(),
        },
    }
}

// SARIF structures

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    help: SarifMessage,
    properties: SarifRuleProperties,
    default_configuration: SarifConfiguration,
}

#[derive(Serialize)]
struct SarifRuleProperties {
    stride: String,
    asvs: String,
    samm: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifConfiguration {
    level: SarifLevel,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: SarifLevel,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    partial_fingerprints: SarifFingerprints,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifFingerprints {
    #[serde(rename = "threatId/v1")]
    threat_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    physical_location: Option<SarifPhysicalLocation>,
    logical_locations: Vec<SarifLogicalLocation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLogicalLocation {
    name: String,
    kind: &'static str,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum SarifLevel {
    Note,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::model::DataFlow;
    use crate::reports::ReportMetadata;

    fn sample() -> (AnalysisInput, ThreatModel) {
        let input = AnalysisInput::new("login api")
            .with_flow(DataFlow::new("User", "API", "PII"))
            .with_flow(DataFlow::new("API", "DB", "SQL"));
        let model = analyze(&input);
        (input, model)
    }

    #[test]
    fn test_sarif_structure() {
        let (input, model) = sample();
        let config = ReportConfig::default()
            .with_metadata(ReportMetadata::new().with_model_path("model.yaml"));
        let sarif = SarifReporter::new().generate(&input, &model, &config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&sarif).unwrap();

        assert_eq!(value["version"], "2.1.0");
        let run = &value["runs"][0];
        assert_eq!(run["results"].as_array().unwrap().len(), model.len());

        // two flows share the four flow rules
        let rules = run["tool"]["driver"]["rules"].as_array().unwrap();
        let ids: std::collections::HashSet<&str> =
            rules.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids.len(), rules.len());
        assert!(ids.contains("FLOW-T-001"));

        let flow_result = run["results"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["ruleId"] == "FLOW-T-001")
            .unwrap();
        assert_eq!(flow_result["locations"][0]["logicalLocations"][0]["kind"], "dataFlow");
        assert_eq!(
            flow_result["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "model.yaml"
        );
    }

    #[test]
    fn test_sarif_without_notes() {
        let (input, model) = sample();
        let sarif = SarifReporter::new()
            .include_notes(false)
            .generate(&input, &model, &ReportConfig::default())
            .unwrap();
        assert!(!sarif.contains("\"level\": \"note\""));
    }
}
