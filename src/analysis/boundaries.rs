//! Boundary analyzer.

use crate::model::{ThreatDraft, ThreatOrigin, TrustBoundary};
use crate::rules::{BoundaryRule, FoldedBoundary};

/// Apply boundary rules to each trust boundary, in input order.
#[must_use]
pub fn analyze_boundaries(boundaries: &[TrustBoundary], rules: &[BoundaryRule]) -> Vec<ThreatDraft> {
    let mut drafts = Vec::new();
    for boundary in boundaries {
        let folded = FoldedBoundary::new(boundary);
        let vars = folded.vars();
        drafts.extend(
            rules
                .iter()
                .filter(|rule| rule.when.evaluate(&folded))
                .map(|rule| rule.template.render(ThreatOrigin::Boundary, &boundary.name, &vars)),
        );
    }
    drafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StrideCategory;
    use crate::rules::{builtin, CatalogOptions};

    fn run(boundary: TrustBoundary, options: &CatalogOptions) -> Vec<ThreatDraft> {
        analyze_boundaries(&[boundary], &builtin::boundary_rules(options))
    }

    #[test]
    fn test_dmz_spoofing_and_privilege() {
        let drafts = run(TrustBoundary::new("DMZ", "edge network"), &CatalogOptions::default());
        let categories: Vec<_> = drafts.iter().map(|d| d.category).collect();
        assert_eq!(
            categories,
            [StrideCategory::Spoofing, StrideCategory::ElevationOfPrivilege]
        );
        assert_eq!(drafts[0].description, "Cross-boundary spoofing possible in dmz.");
        assert!(drafts.iter().all(|d| d.dfd_element == "DMZ"));
    }

    #[test]
    fn test_backend_tampering() {
        let drafts = run(
            TrustBoundary::new("Backend Services", "internal"),
            &CatalogOptions::default(),
        );
        let ids: Vec<_> = drafts.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(ids, ["BND-T-001", "BND-E-001"]);
        assert_eq!(
            drafts[0].description,
            "Data tampering within backend services due to weak internal controls."
        );
    }

    #[test]
    fn test_frontend_spoofing_is_opt_in() {
        let boundary = TrustBoundary::new("Frontend", "browser tier");
        assert_eq!(run(boundary.clone(), &CatalogOptions::default()).len(), 1);

        let extended = CatalogOptions {
            boundary_frontend_spoofing: true,
            ..CatalogOptions::default()
        };
        assert_eq!(run(boundary, &extended)[0].rule_id, "BND-S-001");
    }

    #[test]
    fn test_description_is_ignored_by_builtins() {
        let drafts = run(
            TrustBoundary::new("Zone A", "dmz database server"),
            &CatalogOptions::default(),
        );
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].category, StrideCategory::ElevationOfPrivilege);
    }
}
