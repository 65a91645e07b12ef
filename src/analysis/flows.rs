//! Flow analyzer.

use crate::model::{DataFlow, ThreatDraft, ThreatOrigin};
use crate::rules::{FlowRule, FoldedFlow};

/// Apply flow rules to each flow, in input order.
///
/// All threats for one flow are emitted before the next flow is considered.
/// Threats attach to the original-case edge label; descriptions use the
/// case-folded endpoint names.
#[must_use]
pub fn analyze_flows(flows: &[DataFlow], rules: &[FlowRule]) -> Vec<ThreatDraft> {
    let mut drafts = Vec::new();
    for flow in flows {
        let folded = FoldedFlow::new(flow);
        let vars = folded.vars();
        let element = flow.edge_label();
        drafts.extend(
            rules
                .iter()
                .filter(|rule| rule.when.evaluate(&folded))
                .map(|rule| rule.template.render(ThreatOrigin::Flow, &element, &vars)),
        );
    }
    drafts
}
