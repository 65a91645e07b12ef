//! Rule kinds, one per analysis stage.

use super::condition::{Condition, TextCondition, TextFields};
use super::template::ThreatTemplate;
use crate::model::{DataFlow, Feature, TrustBoundary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Analysis stage a rule belongs to, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStage {
    System,
    Flow,
    Boundary,
    Diagram,
}

impl fmt::Display for RuleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Flow => write!(f, "flow"),
            Self::Boundary => write!(f, "boundary"),
            Self::Diagram => write!(f, "diagram"),
        }
    }
}

/// Gated by the description's feature vector; attached to `"System"`.
#[derive(Debug, Clone)]
pub struct SystemRule {
    pub template: ThreatTemplate,
    pub when: Condition,
}

/// Flow fields visible to flow rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowField {
    Source,
    Destination,
    #[serde(alias = "dataType", alias = "data-type")]
    DataType,
}

impl fmt::Display for FlowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Destination => write!(f, "destination"),
            Self::DataType => write!(f, "data_type"),
        }
    }
}

/// Case-folded copy of a flow.
#[derive(Debug, Clone)]
pub struct FoldedFlow {
    pub source: String,
    pub destination: String,
    pub data_type: String,
}

impl FoldedFlow {
    #[must_use]
    pub fn new(flow: &DataFlow) -> Self {
        Self {
            source: flow.source.to_lowercase(),
            destination: flow.destination.to_lowercase(),
            data_type: flow.data_type.to_lowercase(),
        }
    }

    /// Template variables for flow rules.
    #[must_use]
    pub fn vars(&self) -> [(&str, &str); 3] {
        [
            ("source", self.source.as_str()),
            ("destination", self.destination.as_str()),
            ("data_type", self.data_type.as_str()),
        ]
    }
}

impl TextFields<FlowField> for FoldedFlow {
    fn field(&self, field: FlowField) -> &str {
        match field {
            FlowField::Source => &self.source,
            FlowField::Destination => &self.destination,
            FlowField::DataType => &self.data_type,
        }
    }
}

/// Evaluated once per declared data flow.
#[derive(Debug, Clone)]
pub struct FlowRule {
    pub template: ThreatTemplate,
    pub when: TextCondition<FlowField>,
}

/// Boundary fields visible to boundary rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryField {
    Name,
    Description,
}

impl fmt::Display for BoundaryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Description => write!(f, "description"),
        }
    }
}

/// Case-folded copy of a trust boundary.
#[derive(Debug, Clone)]
pub struct FoldedBoundary {
    pub name: String,
    pub description: String,
}

impl FoldedBoundary {
    #[must_use]
    pub fn new(boundary: &TrustBoundary) -> Self {
        Self {
            name: boundary.name.to_lowercase(),
            description: boundary.description.to_lowercase(),
        }
    }

    #[must_use]
    pub fn vars(&self) -> [(&str, &str); 2] {
        [
            ("name", self.name.as_str()),
            ("description", self.description.as_str()),
        ]
    }
}

impl TextFields<BoundaryField> for FoldedBoundary {
    fn field(&self, field: BoundaryField) -> &str {
        match field {
            BoundaryField::Name => &self.name,
            BoundaryField::Description => &self.description,
        }
    }
}

/// Evaluated once per declared trust boundary.
#[derive(Debug, Clone)]
pub struct BoundaryRule {
    pub template: ThreatTemplate,
    pub when: TextCondition<BoundaryField>,
}

/// Diagram component inferred from a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMapping {
    pub feature: Feature,
    pub component: String,
}

impl ComponentMapping {
    #[must_use]
    pub fn new(feature: Feature, component: &str) -> Self {
        Self {
            feature,
            component: component.to_string(),
        }
    }
}

/// Applied to every inferred diagram component.
#[derive(Debug, Clone)]
pub struct ComponentRule {
    pub template: ThreatTemplate,
}
