//! Threat-model input.
//!
//! Input arrives as a YAML or JSON document, as command-line values, or as
//! both (command-line values are appended to the document). Everything is
//! validated here, before the engine runs:
//!
//! - flows need a non-blank source, destination and data type;
//! - boundaries need a non-blank name;
//! - a description or a diagram must be present.
//!
//! ## Usage
//!
//! ```no_run
//! use stride_tools::parsers::{parse_model, validate_input};
//! use std::path::Path;
//!
//! let input = parse_model(Path::new("model.yaml")).unwrap();
//! validate_input(&input).unwrap();
//! ```

mod document;
mod inline;

pub use document::{example_model_yaml, BoundaryEntry, FlowEntry, ModelDocument};
pub use inline::{parse_boundary_arg, parse_flow_arg};

use crate::error::{ErrorContext, InputErrorKind, Result, StrideError};
use crate::model::{AnalysisInput, DataFlow, DiagramRef, TrustBoundary};
use std::fmt;
use std::path::{Path, PathBuf};

/// Maximum threat-model file size (16 MB).
const MAX_MODEL_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Serialization of a threat-model document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Yaml,
    Json,
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// Detect the document format: extension first, then content.
#[must_use]
pub fn detect_format(path: Option<&Path>, content: &str) -> Option<ModelFormat> {
    let by_extension = path
        .and_then(Path::extension)
        .and_then(|ext| ext.to_str())
        .and_then(|ext| match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(ModelFormat::Yaml),
            "json" => Some(ModelFormat::Json),
            _ => None,
        });
    if by_extension.is_some() {
        return by_extension;
    }

    let trimmed = content.trim_start();
    if trimmed.starts_with('{') {
        Some(ModelFormat::Json)
    } else if trimmed.starts_with("---") || trimmed.lines().any(|l| l.contains(':')) {
        Some(ModelFormat::Yaml)
    } else {
        None
    }
}

/// Load and validate a threat-model file.
///
/// Relative diagram paths are resolved against the file's directory.
pub fn parse_model(path: &Path) -> Result<AnalysisInput> {
    let metadata = std::fs::metadata(path).map_err(|e| StrideError::io(path, e))?;
    if metadata.len() > MAX_MODEL_FILE_SIZE {
        return Err(StrideError::validation(format!(
            "threat model {} is {} MB, exceeding the {} MB limit",
            path.display(),
            metadata.len() / (1024 * 1024),
            MAX_MODEL_FILE_SIZE / (1024 * 1024),
        )));
    }
    let content = std::fs::read_to_string(path).map_err(|e| StrideError::io(path, e))?;

    let format = detect_format(Some(path), &content).ok_or_else(|| {
        StrideError::input(path.display().to_string(), InputErrorKind::UnknownFormat)
    })?;
    tracing::debug!("Loading {} threat model from {}", format, path.display());

    parse_document(&content, format)
        .and_then(|doc| doc.into_input(path.parent()))
        .with_context(|| format!("loading {}", path.display()))
}

/// Parse a threat model from string content.
pub fn parse_model_str(content: &str, format: Option<ModelFormat>) -> Result<AnalysisInput> {
    let format = format
        .or_else(|| detect_format(None, content))
        .ok_or_else(|| StrideError::input("threat model", InputErrorKind::UnknownFormat))?;
    parse_document(content, format)?.into_input(None)
}

fn parse_document(content: &str, format: ModelFormat) -> Result<ModelDocument> {
    match format {
        ModelFormat::Json => Ok(serde_json::from_str(content)?),
        // an empty YAML document is an empty model, not an error
        ModelFormat::Yaml if content.trim().is_empty() => Ok(ModelDocument::default()),
        ModelFormat::Yaml => Ok(serde_yaml::from_str(content)?),
    }
}

/// Command-line additions to a loaded (or empty) model.
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    /// Replaces the document's description when set
    pub description: Option<String>,
    /// `source,destination,data type` values, appended in order
    pub flows: Vec<String>,
    /// `name:description` values, appended in order
    pub boundaries: Vec<String>,
    /// Replaces the document's diagram when set
    pub diagram: Option<PathBuf>,
}

impl InputOverrides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.flows.is_empty()
            && self.boundaries.is_empty()
            && self.diagram.is_none()
    }

    /// Apply to `input`, parsing the inline values.
    pub fn apply(&self, mut input: AnalysisInput) -> Result<AnalysisInput> {
        if let Some(description) = &self.description {
            input.description.clone_from(description);
        }
        let flows: Vec<DataFlow> = self
            .flows
            .iter()
            .map(|f| parse_flow_arg(f))
            .collect::<Result<_>>()?;
        let boundaries: Vec<TrustBoundary> = self
            .boundaries
            .iter()
            .map(|b| parse_boundary_arg(b))
            .collect::<Result<_>>()?;
        input.flows.extend(flows);
        input.boundaries.extend(boundaries);
        if let Some(diagram) = &self.diagram {
            input.diagram = Some(DiagramRef::new(diagram.clone()));
        }
        Ok(input)
    }
}

/// Reject input the engine should never see.
///
/// Zero flows and zero boundaries are fine; an input with neither a
/// description nor a diagram is not.
pub fn validate_input(input: &AnalysisInput) -> Result<()> {
    if !input.has_description() && !input.has_diagram() {
        return Err(StrideError::nothing_to_analyze());
    }

    for (i, flow) in input.flows.iter().enumerate() {
        let blank = [
            ("source", &flow.source),
            ("destination", &flow.destination),
            ("dataType", &flow.data_type),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());
        if let Some((field, _)) = blank {
            return Err(StrideError::input(
                "threat model",
                InputErrorKind::MalformedFlow {
                    index: i + 1,
                    field: field.to_string(),
                },
            ));
        }
    }

    for (i, boundary) in input.boundaries.iter().enumerate() {
        let blank = [("name", &boundary.name), ("description", &boundary.description)]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());
        if let Some((field, _)) = blank {
            return Err(StrideError::input(
                "threat model",
                InputErrorKind::MalformedBoundary {
                    index: i + 1,
                    field: field.to_string(),
                },
            ));
        }
    }

    Ok(())
}

/// Check that a referenced diagram exists. Its content is not read.
pub fn check_diagram(diagram: &DiagramRef) -> Result<()> {
    if diagram.path.is_file() {
        Ok(())
    } else {
        Err(StrideError::input(
            "diagram",
            InputErrorKind::DiagramNotFound(diagram.path.clone()),
        ))
    }
}
