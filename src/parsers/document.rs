//! Threat-model documents as written by users.
//!
//! Every field is optional at the serde level so that missing values can be
//! reported with the entry's position and field name instead of a generic
//! deserialization error.

use crate::error::{InputErrorKind, Result, StrideError};
use crate::model::{AnalysisInput, DataFlow, DiagramRef, TrustBoundary};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root of a YAML/JSON threat-model file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "dataFlows", alias = "data_flows")]
    pub flows: Vec<FlowEntry>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        alias = "trustBoundaries",
        alias = "trust_boundaries"
    )]
    pub boundaries: Vec<BoundaryEntry>,

    /// Path of an uploaded diagram, relative to the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowEntry {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default, rename = "dataType", alias = "data_type", alias = "type")]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundaryEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Take a required, non-blank field.
fn required(value: Option<String>, missing: impl FnOnce() -> InputErrorKind) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(StrideError::input("threat model", missing())),
    }
}

impl FlowEntry {
    /// Validate into a [`DataFlow`]; `index` is 1-based.
    pub fn into_flow(self, index: usize) -> Result<DataFlow> {
        let malformed = |field: &str| InputErrorKind::MalformedFlow {
            index,
            field: field.to_string(),
        };
        Ok(DataFlow {
            source: required(self.source, || malformed("source"))?,
            destination: required(self.destination, || malformed("destination"))?,
            data_type: required(self.data_type, || malformed("dataType"))?,
        })
    }
}

impl From<&DataFlow> for FlowEntry {
    fn from(flow: &DataFlow) -> Self {
        Self {
            source: Some(flow.source.clone()),
            destination: Some(flow.destination.clone()),
            data_type: Some(flow.data_type.clone()),
        }
    }
}

impl BoundaryEntry {
    /// Validate into a [`TrustBoundary`]; `index` is 1-based.
    pub fn into_boundary(self, index: usize) -> Result<TrustBoundary> {
        let malformed = |field: &str| InputErrorKind::MalformedBoundary {
            index,
            field: field.to_string(),
        };
        Ok(TrustBoundary {
            name: required(self.name, || malformed("name"))?,
            description: required(self.description, || malformed("description"))?,
        })
    }
}

impl From<&TrustBoundary> for BoundaryEntry {
    fn from(boundary: &TrustBoundary) -> Self {
        Self {
            name: Some(boundary.name.clone()),
            description: Some(boundary.description.clone()),
        }
    }
}

impl ModelDocument {
    /// Validate entries and build the analysis input.
    ///
    /// A relative diagram path is resolved against `base_dir`.
    pub fn into_input(self, base_dir: Option<&Path>) -> Result<AnalysisInput> {
        let flows = self
            .flows
            .into_iter()
            .enumerate()
            .map(|(i, entry)| entry.into_flow(i + 1))
            .collect::<Result<Vec<_>>>()?;
        let boundaries = self
            .boundaries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| entry.into_boundary(i + 1))
            .collect::<Result<Vec<_>>>()?;
        let diagram = self.diagram.map(|path| match base_dir {
            Some(base) if path.is_relative() => DiagramRef::new(base.join(path)),
            _ => DiagramRef::new(path),
        });

        Ok(AnalysisInput {
            description: self.description.unwrap_or_default(),
            flows,
            boundaries,
            diagram,
        })
    }
}

impl From<&AnalysisInput> for ModelDocument {
    fn from(input: &AnalysisInput) -> Self {
        Self {
            description: input.has_description().then(|| input.description.clone()),
            flows: input.flows.iter().map(FlowEntry::from).collect(),
            boundaries: input.boundaries.iter().map(BoundaryEntry::from).collect(),
            diagram: input.diagram.as_ref().map(|d| d.path.clone()),
        }
    }
}

/// Commented example document written by `stride-tools init`.
#[must_use]
pub fn example_model_yaml() -> String {
    r#"# stride-tools threat model
#
# Describe the system in plain words. Keywords such as "login", "API",
# "database", "cloud", "third party" or "public facing" drive the
# system-level STRIDE rules.
description: >
  A public facing web application where customers login with a password.
  It calls a REST API that stores orders in a cloud database and forwards
  payments to an external third party gateway.

# Directed data flows, analyzed in order.
flows:
  - source: User
    destination: Frontend
    dataType: Credentials
  - source: Frontend
    destination: API Server
    dataType: PII
  - source: API Server
    destination: Database
    dataType: Sensitive order data
  - source: API Server
    destination: Payment Gateway
    dataType: Confidential payment tokens

# Trust boundaries, analyzed in order.
boundaries:
  - name: DMZ
    description: frontend exposed to the internet
  - name: Backend Network
    description: api server and database

# Optional uploaded diagram; only its presence is used.
# diagram: dfd.png
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_entry_missing_field() {
        let entry = FlowEntry {
            source: Some("User".to_string()),
            destination: Some("  ".to_string()),
            data_type: Some("PII".to_string()),
        };
        let err = entry.into_flow(3).unwrap_err();
        match err {
            StrideError::Input {
                source: InputErrorKind::MalformedFlow { index, field },
                ..
            } => {
                assert_eq!(index, 3);
                assert_eq!(field, "destination");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_boundary_entry_trimmed() {
        let boundary = BoundaryEntry {
            name: Some(" DMZ ".to_string()),
            description: Some("edge network ".to_string()),
        }
        .into_boundary(1)
        .unwrap();
        assert_eq!(boundary, TrustBoundary::new("DMZ", "edge network"));
    }

    #[test]
    fn test_boundary_entry_requires_description() {
        for description in [None, Some("   ".to_string())] {
            let err = BoundaryEntry {
                name: Some("DMZ".to_string()),
                description,
            }
            .into_boundary(2)
            .unwrap_err();
            match err {
                StrideError::Input {
                    source: InputErrorKind::MalformedBoundary { index, field },
                    ..
                } => {
                    assert_eq!(index, 2);
                    assert_eq!(field, "description");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_diagram_resolved_against_base() {
        let doc = ModelDocument {
            description: Some("x".to_string()),
            diagram: Some(PathBuf::from("dfd.png")),
            ..ModelDocument::default()
        };
        let input = doc.into_input(Some(Path::new("/models"))).unwrap();
        assert_eq!(
            input.diagram.map(|d| d.path),
            Some(PathBuf::from("/models/dfd.png"))
        );
    }

    #[test]
    fn test_example_parses() {
        let doc: ModelDocument = serde_yaml::from_str(&example_model_yaml()).unwrap();
        let input = doc.into_input(None).unwrap();
        assert_eq!(input.flows.len(), 4);
        assert_eq!(input.boundaries.len(), 2);
        assert!(input.diagram.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_yaml::from_str::<ModelDocument>("description: x\nflow: []\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_document_from_input() {
        let input = AnalysisInput::new("api").with_flow(DataFlow::new("A", "B", "c"));
        let doc = ModelDocument::from(&input);
        assert_eq!(doc.into_input(None).unwrap(), input);
    }
}
