//! JSON report generator.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::model::{AnalysisInput, DataFlow, FeatureSet, Threat, ThreatModel, ThreatSummary, TrustBoundary};
use serde::Serialize;

/// JSON report generator
pub struct JsonReporter {
    /// Pretty print output
    pretty: bool,
    /// Echo the analyzed input back into the report
    include_input: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pretty: true,
            include_input: true,
        }
    }

    /// Set pretty printing
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set whether the input flows and boundaries are echoed
    #[must_use]
    pub const fn include_input(mut self, include: bool) -> Self {
        self.include_input = include;
        self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate(
        &self,
        input: &AnalysisInput,
        model: &ThreatModel,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let report = JsonThreatReport {
            metadata: JsonReportMetadata {
                tool: ToolInfo {
                    name: env!("CARGO_PKG_NAME").to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                title: config.title_or_default().to_string(),
                generated_at: config.metadata.timestamp(),
                model_path: config.metadata.model_path.clone(),
                fingerprint: model.fingerprint.clone(),
            },
            input: self.include_input.then(|| JsonInput {
                description: &input.description,
                flows: &input.flows,
                boundaries: &input.boundaries,
                diagram: input.diagram.as_ref().map(|d| d.display_name()),
            }),
            features: model.features,
            summary: &model.summary,
            threats: &model.threats,
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        json.map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonThreatReport<'a> {
    metadata: JsonReportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<JsonInput<'a>>,
    features: FeatureSet,
    summary: &'a ThreatSummary,
    threats: &'a [Threat],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReportMetadata {
    tool: ToolInfo,
    title: String,
    generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_path: Option<String>,
    fingerprint: String,
}

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    version: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonInput<'a> {
    description: &'a str,
    flows: &'a [DataFlow],
    boundaries: &'a [TrustBoundary],
    #[serde(skip_serializing_if = "Option::is_none")]
    diagram: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::reports::ReportMetadata;

    #[test]
    fn test_json_threat_fields() {
        let input = AnalysisInput::new("login api").with_flow(DataFlow::new("User", "API", "PII"));
        let model = analyze(&input);
        let config = ReportConfig::default()
            .with_metadata(ReportMetadata::new().with_model_path("model.yaml"));
        let json = JsonReporter::new().generate(&input, &model, &config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["tool"]["name"], "stride-tools");
        assert_eq!(value["metadata"]["modelPath"], "model.yaml");
        assert_eq!(value["features"]["api"], true);
        assert_eq!(value["input"]["flows"][0]["dataType"], "PII");

        let first = &value["threats"][0];
        assert_eq!(first["id"], "T1");
        assert_eq!(first["type"], "Spoofing");
        assert_eq!(first["stride"], "Spoofing");
        assert_eq!(first["dfdElement"], "System");
        assert_eq!(value["summary"]["total"], model.len());
    }

    #[test]
    fn test_json_compact_without_input() {
        let input = AnalysisInput::new("calculator");
        let model = analyze(&input);
        let json = JsonReporter::new()
            .pretty(false)
            .include_input(false)
            .generate(&input, &model, &ReportConfig::default())
            .unwrap();
        assert!(!json.contains('\n'));
        assert!(!json.contains("\"input\""));
        assert!(json.contains("\"threats\":[]"));
    }
}
