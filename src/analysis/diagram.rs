//! Diagram-component stage.
//!
//! The diagram itself is never read. Its presence enables a set of
//! components inferred from the feature vector, and each component gets the
//! per-component rules.

use crate::model::{FeatureSet, ThreatDraft, ThreatOrigin};
use crate::rules::{ComponentMapping, ComponentRule};

/// Components implied by the features, in mapping order.
#[must_use]
pub fn inferred_components<'a>(
    features: &FeatureSet,
    mappings: &'a [ComponentMapping],
) -> Vec<&'a str> {
    mappings
        .iter()
        .filter(|m| features.get(m.feature))
        .map(|m| m.component.as_str())
        .collect()
}

/// Emit component threats; empty when no diagram was supplied.
#[must_use]
pub fn analyze_diagram(
    has_diagram: bool,
    features: &FeatureSet,
    mappings: &[ComponentMapping],
    rules: &[ComponentRule],
) -> Vec<ThreatDraft> {
    if !has_diagram {
        return Vec::new();
    }

    inferred_components(features, mappings)
        .into_iter()
        .flat_map(|component| {
            let vars = [("component", component)];
            rules
                .iter()
                .map(move |rule| rule.template.render(ThreatOrigin::Diagram, component, &vars))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Feature, StrideCategory};
    use crate::rules::builtin;

    #[test]
    fn test_web_and_database_components() {
        let features = FeatureSet::from_features(&[Feature::Database, Feature::Web]);
        let drafts = analyze_diagram(
            true,
            &features,
            &builtin::component_mappings(),
            &builtin::component_rules(),
        );
        assert_eq!(drafts.len(), 6);
        let elements: Vec<_> = drafts.iter().map(|d| d.dfd_element.as_str()).collect();
        assert_eq!(
            elements,
            [
                "Web Application",
                "Web Application",
                "Web Application",
                "Database",
                "Database",
                "Database"
            ]
        );
        assert_eq!(drafts[3].category, StrideCategory::Spoofing);
        assert_eq!(
            drafts[5].mitigation,
            "Implement rate limiting and auto-scaling for Database, and use WAF for protection."
        );
        assert!(drafts.iter().all(|d| d.controls.is_none()));
    }

    #[test]
    fn test_no_diagram_no_threats() {
        let features = FeatureSet::from_features(&Feature::ALL);
        assert!(analyze_diagram(
            false,
            &features,
            &builtin::component_mappings(),
            &builtin::component_rules()
        )
        .is_empty());
    }

    #[test]
    fn test_unmapped_features_ignored() {
        let features = FeatureSet::from_features(&[Feature::Authentication, Feature::ThirdParty]);
        assert!(inferred_components(&features, &builtin::component_mappings()).is_empty());
    }
}
