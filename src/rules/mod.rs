//! The rule table.
//!
//! Every threat the engine can emit comes from a declarative rule: a
//! precondition plus a [`ThreatTemplate`]. Rules are grouped by analysis
//! stage and evaluated in table order, which fixes the order (and so the
//! identifiers) of emitted threats.
//!
//! The table starts from the built-in catalogue (see [`builtin`]) and can be
//! extended with a [`CustomRulesConfig`]; custom rules always run after the
//! built-ins of their stage.

pub mod builtin;
mod condition;
mod custom;
mod keywords;
mod stage;
mod template;

pub use builtin::{CatalogOptions, DosRuleVariant};
pub use condition::{Condition, ConditionSpec, TextCondition, TextConditionSpec, TextFields};
pub use custom::{
    CustomBoundaryRule, CustomFlowRule, CustomRulesConfig, CustomRulesSummary, CustomSystemRule,
};
pub use keywords::KeywordCatalog;
pub use stage::{
    BoundaryField, BoundaryRule, ComponentMapping, ComponentRule, FlowField, FlowRule,
    FoldedBoundary, FoldedFlow, RuleStage, SystemRule,
};
pub use template::{fill, ThreatTemplate};

use crate::error::{Result, RuleErrorKind, StrideError};
use crate::model::{Feature, StrideCategory};
use serde::Serialize;
use std::collections::HashSet;

/// Effective set of rules for one analysis configuration.
#[derive(Debug, Clone)]
pub struct RuleTable {
    keywords: KeywordCatalog,
    system: Vec<SystemRule>,
    flows: Vec<FlowRule>,
    boundaries: Vec<BoundaryRule>,
    components: Vec<ComponentRule>,
    mappings: Vec<ComponentMapping>,
}

impl RuleTable {
    /// Built-in catalogue with the given variant switches.
    #[must_use]
    pub fn builtin(options: &CatalogOptions) -> Self {
        Self {
            keywords: KeywordCatalog::builtin(),
            system: builtin::system_rules(options),
            flows: builtin::flow_rules(),
            boundaries: builtin::boundary_rules(options),
            components: builtin::component_rules(),
            mappings: builtin::component_mappings(),
        }
    }

    /// Apply a custom rules file: disable, extend keywords, then append.
    pub fn with_custom(mut self, custom: &CustomRulesConfig) -> Result<Self> {
        for id in &custom.disabled {
            if !self.disable(id) {
                return Err(StrideError::rules(
                    "disabled rules",
                    RuleErrorKind::UnknownRuleId(id.clone()),
                ));
            }
        }

        for (name, words) in &custom.keywords {
            let feature: Feature = name
                .parse()
                .map_err(|_| condition::unknown_feature(name))?;
            self.keywords.extend(feature, words);
        }

        let mut ids: HashSet<String> = self.ids().into_iter().map(str::to_string).collect();
        let mut claim = |template: &ThreatTemplate| -> Result<()> {
            template.validate()?;
            if ids.insert(template.id.clone()) {
                Ok(())
            } else {
                Err(StrideError::rules(
                    "custom rules",
                    RuleErrorKind::DuplicateRuleId(template.id.clone()),
                ))
            }
        };

        for rule in &custom.system {
            claim(&rule.template)?;
            self.system.push(SystemRule {
                template: rule.template.clone(),
                when: rule.when.compile().map_err(|e| in_rule(e, &rule.template.id))?,
            });
        }
        for rule in &custom.flows {
            claim(&rule.template)?;
            self.flows.push(FlowRule {
                template: rule.template.clone(),
                when: rule.when.compile().map_err(|e| in_rule(e, &rule.template.id))?,
            });
        }
        for rule in &custom.boundaries {
            claim(&rule.template)?;
            self.boundaries.push(BoundaryRule {
                template: rule.template.clone(),
                when: rule.when.compile().map_err(|e| in_rule(e, &rule.template.id))?,
            });
        }
        for template in &custom.components {
            claim(template)?;
            self.components.push(ComponentRule {
                template: template.clone(),
            });
        }

        tracing::debug!(
            "Applied custom rules ({}); table now holds {} rules",
            custom.summary(),
            self.len()
        );
        Ok(self)
    }

    /// Remove a rule by id from whichever stage holds it.
    fn disable(&mut self, id: &str) -> bool {
        let before = self.len();
        self.system.retain(|r| r.template.id != id);
        self.flows.retain(|r| r.template.id != id);
        self.boundaries.retain(|r| r.template.id != id);
        self.components.retain(|r| r.template.id != id);
        self.len() < before
    }

    #[must_use]
    pub fn keywords(&self) -> &KeywordCatalog {
        &self.keywords
    }

    #[must_use]
    pub fn system_rules(&self) -> &[SystemRule] {
        &self.system
    }

    #[must_use]
    pub fn flow_rules(&self) -> &[FlowRule] {
        &self.flows
    }

    #[must_use]
    pub fn boundary_rules(&self) -> &[BoundaryRule] {
        &self.boundaries
    }

    #[must_use]
    pub fn component_rules(&self) -> &[ComponentRule] {
        &self.components
    }

    #[must_use]
    pub fn component_mappings(&self) -> &[ComponentMapping] {
        &self.mappings
    }

    /// Number of rules across all stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.system.len() + self.flows.len() + self.boundaries.len() + self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rule ids in evaluation order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.templates().map(|(_, t)| t.id.as_str()).collect()
    }

    /// Look up a template by rule id.
    #[must_use]
    pub fn template(&self, id: &str) -> Option<&ThreatTemplate> {
        self.templates().map(|(_, t)| t).find(|t| t.id == id)
    }

    fn templates(&self) -> impl Iterator<Item = (RuleStage, &ThreatTemplate)> {
        self.system
            .iter()
            .map(|r| (RuleStage::System, &r.template))
            .chain(self.flows.iter().map(|r| (RuleStage::Flow, &r.template)))
            .chain(self.boundaries.iter().map(|r| (RuleStage::Boundary, &r.template)))
            .chain(self.components.iter().map(|r| (RuleStage::Diagram, &r.template)))
    }

    /// Flattened, printable view of every rule, in evaluation order.
    #[must_use]
    pub fn entries(&self) -> Vec<RuleEntry> {
        let components: Vec<&str> = self.mappings.iter().map(|m| m.component.as_str()).collect();
        let diagram_trigger = format!("diagram supplied; per component ({})", components.join(", "));

        let triggers = self
            .system
            .iter()
            .map(|r| r.when.to_string())
            .chain(self.flows.iter().map(|r| r.when.to_string()))
            .chain(self.boundaries.iter().map(|r| r.when.to_string()))
            .chain(self.components.iter().map(|_| diagram_trigger.clone()));

        self.templates()
            .zip(triggers)
            .map(|((stage, template), trigger)| RuleEntry {
                id: template.id.clone(),
                stage,
                category: template.category,
                trigger,
                description: template.description.clone(),
                mitigation: template.mitigation.clone(),
                controls: template.controls.clone(),
                asvs: template.asvs.clone(),
                samm: template.samm.clone(),
            })
            .collect()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin(&CatalogOptions::default())
    }
}

/// Attach the rule id to a condition compile error.
fn in_rule(err: StrideError, id: &str) -> StrideError {
    match err {
        StrideError::Rules { context, source } => {
            StrideError::rules(format!("rule {id}: {context}"), source)
        }
        other => other,
    }
}

/// One rule as listed by `stride-tools rules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    pub id: String,
    pub stage: RuleStage,
    pub category: StrideCategory,
    /// Human-readable precondition
    pub trigger: String,
    pub description: String,
    pub mitigation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls: Option<String>,
    pub asvs: String,
    pub samm: String,
}
