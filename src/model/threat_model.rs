//! Result of one analysis pass.

use super::{AnalysisInput, FeatureSet, StrideCategory, Threat, ThreatId, ThreatOrigin};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

/// Threats produced for one input, plus the features that gated them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatModel {
    /// Features detected in the description
    pub features: FeatureSet,
    /// Threats in emission order (`T1..Tn`)
    pub threats: Vec<Threat>,
    /// Per-category and per-origin counts
    pub summary: ThreatSummary,
    /// Stable digest of the analyzed input
    pub fingerprint: String,
}

impl ThreatModel {
    /// Assemble a model, computing its summary and input fingerprint.
    #[must_use]
    pub fn new(input: &AnalysisInput, features: FeatureSet, threats: Vec<Threat>) -> Self {
        let summary = ThreatSummary::from_threats(&threats);
        Self {
            features,
            threats,
            summary,
            fingerprint: fingerprint_input(input),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.threats.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.threats.is_empty()
    }

    /// Look up a threat by identifier.
    #[must_use]
    pub fn threat(&self, id: ThreatId) -> Option<&Threat> {
        // ids are contiguous from T1, so the position is known
        let index = (id.sequence() as usize).checked_sub(1)?;
        self.threats.get(index).filter(|t| t.id == id)
    }

    /// Threats attached to a DFD element, in emission order.
    pub fn threats_for<'a>(&'a self, element: &'a str) -> impl Iterator<Item = &'a Threat> + 'a {
        self.threats.iter().filter(move |t| t.dfd_element == element)
    }

    /// Threats grouped by DFD element, keyed in first-seen order.
    #[must_use]
    pub fn group_by_element(&self) -> IndexMap<&str, Vec<&Threat>> {
        let mut groups: IndexMap<&str, Vec<&Threat>> = IndexMap::new();
        for threat in &self.threats {
            groups.entry(threat.dfd_element.as_str()).or_default().push(threat);
        }
        groups
    }
}

/// Threat counts for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatSummary {
    pub total: usize,
    /// Every STRIDE category, in STRIDE order
    pub by_category: IndexMap<StrideCategory, usize>,
    /// Every origin, in emission-stage order
    pub by_origin: IndexMap<ThreatOrigin, usize>,
}

impl ThreatSummary {
    #[must_use]
    pub fn from_threats(threats: &[Threat]) -> Self {
        let mut by_category: IndexMap<StrideCategory, usize> =
            StrideCategory::ALL.iter().map(|c| (*c, 0)).collect();
        let mut by_origin: IndexMap<ThreatOrigin, usize> =
            ThreatOrigin::ALL.iter().map(|o| (*o, 0)).collect();

        for threat in threats {
            *by_category.entry(threat.category).or_default() += 1;
            *by_origin.entry(threat.origin).or_default() += 1;
        }

        Self {
            total: threats.len(),
            by_category,
            by_origin,
        }
    }

    #[must_use]
    pub fn count(&self, category: StrideCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}

/// Hex digest identifying an input, independent of formatting.
#[must_use]
pub fn fingerprint_input(input: &AnalysisInput) -> String {
    let mut hasher = Xxh3::new();
    let mut feed = |part: &str| {
        hasher.update(part.as_bytes());
        hasher.update(&[0x1f]);
    };

    feed(&input.description);
    for flow in &input.flows {
        feed("flow");
        feed(&flow.source);
        feed(&flow.destination);
        feed(&flow.data_type);
    }
    for boundary in &input.boundaries {
        feed("boundary");
        feed(&boundary.name);
        feed(&boundary.description);
    }
    feed(if input.has_diagram() { "diagram" } else { "no-diagram" });

    format!("{:016x}", hasher.digest())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataFlow, DiagramRef, ThreatDraft};

    fn threat(n: u32, category: StrideCategory, element: &str, origin: ThreatOrigin) -> Threat {
        ThreatDraft {
            rule_id: "TEST".to_string(),
            origin,
            category,
            description: String::new(),
            mitigation: String::new(),
            controls: None,
            asvs: String::new(),
            samm: String::new(),
            dfd_element: element.to_string(),
        }
        .into_threat(ThreatId::new(n))
    }

    #[test]
    fn test_summary_counts_all_categories() {
        let threats = vec![
            threat(1, StrideCategory::Spoofing, "System", ThreatOrigin::System),
            threat(2, StrideCategory::Tampering, "A → B", ThreatOrigin::Flow),
            threat(3, StrideCategory::Tampering, "A → B", ThreatOrigin::Flow),
        ];
        let summary = ThreatSummary::from_threats(&threats);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_category.len(), 6);
        assert_eq!(summary.count(StrideCategory::Tampering), 2);
        assert_eq!(summary.count(StrideCategory::Repudiation), 0);
        assert_eq!(summary.by_origin[&ThreatOrigin::Flow], 2);
    }

    #[test]
    fn test_lookup_and_grouping() {
        let input = AnalysisInput::new("x");
        let model = ThreatModel::new(
            &input,
            FeatureSet::default(),
            vec![
                threat(1, StrideCategory::Spoofing, "A → B", ThreatOrigin::Flow),
                threat(2, StrideCategory::Tampering, "DMZ", ThreatOrigin::Boundary),
                threat(3, StrideCategory::Tampering, "A → B", ThreatOrigin::Flow),
            ],
        );
        assert_eq!(model.threat(ThreatId::new(2)).map(|t| t.dfd_element.as_str()), Some("DMZ"));
        assert!(model.threat(ThreatId::new(9)).is_none());
        assert_eq!(model.threats_for("A → B").count(), 2);

        let groups = model.group_by_element();
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec!["A → B", "DMZ"]);
    }

    #[test]
    fn test_fingerprint_tracks_input() {
        let a = AnalysisInput::new("web app").with_flow(DataFlow::new("User", "API", "PII"));
        let b = a.clone();
        assert_eq!(fingerprint_input(&a), fingerprint_input(&b));

        let c = a.clone().with_diagram(DiagramRef::new("dfd.png"));
        assert_ne!(fingerprint_input(&a), fingerprint_input(&c));
        assert_eq!(fingerprint_input(&a).len(), 16);
    }
}
