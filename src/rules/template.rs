//! Threat templates.
//!
//! A template carries every text field of a threat. Description, mitigation
//! and controls may reference `{placeholder}`s that are filled from the
//! element the rule matched (`{source}`, `{destination}`, `{data_type}`,
//! `{name}`, `{description}`, `{component}`).

use crate::error::{Result, RuleErrorKind, StrideError};
use crate::model::{StrideCategory, ThreatDraft, ThreatOrigin};
use serde::{Deserialize, Serialize};

/// Text payload of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatTemplate {
    /// Stable rule identifier, e.g. `FLOW-T-001`
    pub id: String,
    pub category: StrideCategory,
    pub description: String,
    pub mitigation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<String>,
    #[serde(default)]
    pub asvs: String,
    #[serde(default)]
    pub samm: String,
}

impl ThreatTemplate {
    /// Template without controls.
    #[must_use]
    pub fn new(
        id: &str,
        category: StrideCategory,
        description: &str,
        mitigation: &str,
        asvs: &str,
        samm: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            category,
            description: description.to_string(),
            mitigation: mitigation.to_string(),
            controls: None,
            asvs: asvs.to_string(),
            samm: samm.to_string(),
        }
    }

    #[must_use]
    pub fn with_controls(mut self, controls: &str) -> Self {
        self.controls = Some(controls.to_string());
        self
    }

    /// Reject templates missing the fields every threat must carry.
    pub fn validate(&self) -> Result<()> {
        let incomplete = |reason: &str| {
            Err(StrideError::rules(
                "rule template",
                RuleErrorKind::Incomplete {
                    id: self.id.clone(),
                    reason: reason.to_string(),
                },
            ))
        };

        if self.id.trim().is_empty() {
            return incomplete("rule id is empty");
        }
        if self.description.trim().is_empty() {
            return incomplete("description is empty");
        }
        if self.mitigation.trim().is_empty() {
            return incomplete("mitigation is empty");
        }
        if self.controls.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return incomplete("controls is present but empty");
        }
        Ok(())
    }

    /// Produce an unnumbered threat for `element`.
    #[must_use]
    pub fn render(&self, origin: ThreatOrigin, element: &str, vars: &[(&str, &str)]) -> ThreatDraft {
        ThreatDraft {
            rule_id: self.id.clone(),
            origin,
            category: self.category,
            description: fill(&self.description, vars),
            mitigation: fill(&self.mitigation, vars),
            controls: self.controls.as_deref().map(|c| fill(c, vars)),
            asvs: self.asvs.clone(),
            samm: self.samm.clone(),
            dfd_element: element.to_string(),
        }
    }
}

/// Substitute `{key}` placeholders in one pass.
///
/// Unknown placeholders and unbalanced braces are kept verbatim, and
/// substituted values are never rescanned.
#[must_use]
pub fn fill(text: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_placeholders() {
        let text = fill(
            "Unauthorized access in data flow from {source} to {destination}.",
            &[("source", "user"), ("destination", "api server")],
        );
        assert_eq!(text, "Unauthorized access in data flow from user to api server.");
    }

    #[test]
    fn test_fill_keeps_unknown_and_unbalanced() {
        assert_eq!(fill("{missing} and {", &[("x", "y")]), "{missing} and {");
        assert_eq!(fill("no placeholders", &[]), "no placeholders");
    }

    #[test]
    fn test_fill_does_not_rescan_values() {
        let text = fill("{source}/{destination}", &[("source", "{destination}"), ("destination", "b")]);
        assert_eq!(text, "{destination}/b");
    }

    #[test]
    fn test_render_draft() {
        let template = ThreatTemplate::new(
            "DIAG-S-001",
            StrideCategory::Spoofing,
            "Impersonation of {component} in diagram.",
            "Secure {component} with strong authentication.",
            "V2.1.1",
            "Governance Level 2",
        );
        let draft = template.render(ThreatOrigin::Diagram, "Database", &[("component", "Database")]);
        assert_eq!(draft.description, "Impersonation of Database in diagram.");
        assert_eq!(draft.mitigation, "Secure Database with strong authentication.");
        assert_eq!(draft.dfd_element, "Database");
        assert!(draft.controls.is_none());
        assert_eq!(draft.rule_id, "DIAG-S-001");
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut template = ThreatTemplate::new("X-1", StrideCategory::Tampering, "d", "m", "", "");
        assert!(template.validate().is_ok());

        template.mitigation = "  ".to_string();
        assert!(template.validate().is_err());

        template.mitigation = "m".to_string();
        template.controls = Some(String::new());
        assert!(template.validate().is_err());
    }
}
