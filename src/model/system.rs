//! Declared system elements: data flows, trust boundaries and the analysis input.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Arrow used between source and destination in edge labels.
pub const EDGE_ARROW: &str = "→";

/// One directed edge of the data-flow diagram.
///
/// Duplicates are legal and analyzed independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataFlow {
    pub source: String,
    pub destination: String,
    pub data_type: String,
}

impl DataFlow {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            data_type: data_type.into(),
        }
    }

    /// Edge label in original case: `"<source> → <destination>"`.
    #[must_use]
    pub fn edge_label(&self) -> String {
        format!("{} {EDGE_ARROW} {}", self.source, self.destination)
    }
}

impl fmt::Display for DataFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.edge_label(), self.data_type)
    }
}

/// A named security perimeter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct TrustBoundary {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl TrustBoundary {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Reference to a supplied diagram. Only its presence matters; the
/// content is never read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct DiagramRef {
    pub path: PathBuf,
}

impl DiagramRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File name for display.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// Immutable input to one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisInput {
    /// Free-text system description
    #[serde(default)]
    pub description: String,
    /// Data flows in declaration order
    #[serde(default)]
    pub flows: Vec<DataFlow>,
    /// Trust boundaries in declaration order
    #[serde(default)]
    pub boundaries: Vec<TrustBoundary>,
    /// Uploaded diagram, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<DiagramRef>,
}

impl AnalysisInput {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_flow(mut self, flow: DataFlow) -> Self {
        self.flows.push(flow);
        self
    }

    #[must_use]
    pub fn with_boundary(mut self, boundary: TrustBoundary) -> Self {
        self.boundaries.push(boundary);
        self
    }

    #[must_use]
    pub fn with_diagram(mut self, diagram: DiagramRef) -> Self {
        self.diagram = Some(diagram);
        self
    }

    /// Whether a diagram was supplied.
    #[must_use]
    pub const fn has_diagram(&self) -> bool {
        self.diagram.is_some()
    }

    /// Whether the description carries any non-whitespace text.
    #[must_use]
    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }

    /// Distinct node names in first-seen order across all flow endpoints.
    #[must_use]
    pub fn flow_nodes(&self) -> Vec<&str> {
        let mut nodes: Vec<&str> = Vec::new();
        for flow in &self.flows {
            for name in [flow.source.as_str(), flow.destination.as_str()] {
                if !nodes.contains(&name) {
                    nodes.push(name);
                }
            }
        }
        nodes
    }
}
