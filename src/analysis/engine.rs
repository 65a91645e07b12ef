//! Analysis entry point.

use super::aggregate::aggregate;
use super::boundaries::analyze_boundaries;
use super::detector::{Detector, FeatureEvidence};
use super::diagram::analyze_diagram;
use super::flows::analyze_flows;
use crate::model::{AnalysisInput, ThreatDraft, ThreatModel, ThreatOrigin};
use crate::rules::{CatalogOptions, RuleTable};
use tracing::debug;

/// Engine switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub catalog: CatalogOptions,
    /// Run the diagram-component stage when a diagram is present
    pub diagram_stage: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            catalog: CatalogOptions::default(),
            diagram_stage: true,
        }
    }
}

/// Deterministic STRIDE inference over a rule table.
///
/// [`ThreatEngine::analyze`] is a pure function of the input and the table:
/// running it twice on the same input yields identical models.
#[derive(Debug, Clone)]
pub struct ThreatEngine {
    rules: RuleTable,
    diagram_stage: bool,
}

impl ThreatEngine {
    /// Engine over the built-in catalogue.
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        Self {
            rules: RuleTable::builtin(&options.catalog),
            diagram_stage: options.diagram_stage,
        }
    }

    /// Engine over a prepared (possibly customized) rule table.
    #[must_use]
    pub fn with_rules(rules: RuleTable) -> Self {
        Self {
            rules,
            diagram_stage: true,
        }
    }

    #[must_use]
    pub fn diagram_stage(mut self, enabled: bool) -> Self {
        self.diagram_stage = enabled;
        self
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleTable {
        &self.rules
    }

    #[must_use]
    pub fn detector(&self) -> Detector<'_> {
        Detector::new(self.rules.keywords())
    }

    /// Keyword evidence behind the detected features.
    #[must_use]
    pub fn explain(&self, input: &AnalysisInput) -> Vec<FeatureEvidence> {
        self.detector().explain(&input.description)
    }

    /// Run every stage and number the resulting threats.
    #[must_use]
    pub fn analyze(&self, input: &AnalysisInput) -> ThreatModel {
        let features = self.detector().detect(&input.description);
        debug!("Detected features: {:?}", features.enabled());

        let system: Vec<ThreatDraft> = self
            .rules
            .system_rules()
            .iter()
            .filter(|rule| rule.when.evaluate(&features))
            .map(|rule| rule.template.render(ThreatOrigin::System, "System", &[]))
            .collect();
        debug!("System stage emitted {} threat(s)", system.len());

        let flows = analyze_flows(&input.flows, self.rules.flow_rules());
        debug!(
            "Flow stage emitted {} threat(s) for {} flow(s)",
            flows.len(),
            input.flows.len()
        );

        let boundaries = analyze_boundaries(&input.boundaries, self.rules.boundary_rules());
        debug!(
            "Boundary stage emitted {} threat(s) for {} boundary(ies)",
            boundaries.len(),
            input.boundaries.len()
        );

        let diagram = analyze_diagram(
            self.diagram_stage && input.has_diagram(),
            &features,
            self.rules.component_mappings(),
            self.rules.component_rules(),
        );
        debug!("Diagram stage emitted {} threat(s)", diagram.len());

        let threats = aggregate(system, flows, boundaries, diagram);
        ThreatModel::new(input, features, threats)
    }
}

impl Default for ThreatEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

/// Analyze with the default engine.
#[must_use]
pub fn analyze(input: &AnalysisInput) -> ThreatModel {
    ThreatEngine::default().analyze(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataFlow, DiagramRef, StrideCategory, TrustBoundary};
    use crate::rules::DosRuleVariant;

    #[test]
    fn test_login_api_spoofing_once() {
        let model = analyze(&AnalysisInput::new("A login API for customers"));
        let spoofing: Vec<_> = model
            .threats
            .iter()
            .filter(|t| t.rule_id == "SYS-S-001")
            .collect();
        assert_eq!(spoofing.len(), 1);
        assert_eq!(spoofing[0].dfd_element, "System");
        assert_eq!(spoofing[0].id.to_string(), "T1");
    }

    #[test]
    fn test_nothing_detected() {
        let model = analyze(&AnalysisInput::new("a calculator"));
        assert!(model.is_empty());
        assert!(model.features.is_empty());
    }

    #[test]
    fn test_stage_ordering() {
        let input = AnalysisInput::new("web application with a database")
            .with_flow(DataFlow::new("User", "API Server", "PII"))
            .with_boundary(TrustBoundary::new("DMZ", "edge"))
            .with_diagram(DiagramRef::new("dfd.png"));
        let model = analyze(&input);

        let origins: Vec<_> = model.threats.iter().map(|t| t.origin).collect();
        let mut sorted = origins.clone();
        sorted.sort();
        assert_eq!(origins, sorted);
        assert_eq!(model.summary.by_origin[&ThreatOrigin::Diagram], 6);
    }

    #[test]
    fn test_diagram_stage_switch() {
        let input = AnalysisInput::new("web application").with_diagram(DiagramRef::new("d.png"));
        let on = ThreatEngine::default().analyze(&input);
        let off = ThreatEngine::default().diagram_stage(false).analyze(&input);
        assert_eq!(on.len(), off.len() + 3);
    }

    #[test]
    fn test_dos_variant_on_public_web() {
        let input = AnalysisInput::new("A public facing website");
        let default = ThreatEngine::default().analyze(&input);
        let legacy = ThreatEngine::new(EngineOptions {
            catalog: CatalogOptions {
                dos_rule: DosRuleVariant::ExcludePublicWeb,
                ..CatalogOptions::default()
            },
            ..EngineOptions::default()
        })
        .analyze(&input);

        assert!(default.threats.iter().any(|t| t.rule_id == "SYS-D-001"));
        assert!(!legacy.threats.iter().any(|t| t.rule_id == "SYS-D-001"));
        assert_eq!(legacy.summary.count(StrideCategory::DenialOfService), 1);
    }

    #[test]
    fn test_explain_matches_detection() {
        let engine = ThreatEngine::default();
        let input = AnalysisInput::new("hosted on Azure");
        let detected: Vec<_> = engine
            .explain(&input)
            .into_iter()
            .filter(|e| e.detected())
            .map(|e| e.feature)
            .collect();
        assert_eq!(detected, engine.analyze(&input).features.enabled());
    }
}
