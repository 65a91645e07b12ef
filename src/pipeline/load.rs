//! Input loading stage.

use super::PipelineError;
use crate::config::AnalyzeConfig;
use crate::model::AnalysisInput;
use crate::parsers::{check_diagram, parse_model, validate_input};
use std::path::PathBuf;

/// Validated input plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub input: AnalysisInput,
    /// Model file, when one was given
    pub source: Option<PathBuf>,
}

/// Load the model file (if any), apply command-line additions and validate.
///
/// Unreadable files are load failures; everything the user can fix in the
/// model itself is reported as rejected input.
pub fn load_input(config: &AnalyzeConfig) -> Result<LoadedInput, PipelineError> {
    let quiet = config.behavior.quiet;

    let base = match &config.model {
        Some(path) => {
            if !quiet {
                tracing::info!("Loading threat model: {}", path.display());
            }
            parse_model(path).map_err(|source| {
                if source.is_input_error() {
                    PipelineError::InputRejected { source }
                } else {
                    PipelineError::LoadFailed {
                        path: path.display().to_string(),
                        source,
                    }
                }
            })?
        }
        None => AnalysisInput::default(),
    };

    let input = config
        .overrides
        .apply(base)
        .map_err(|source| PipelineError::InputRejected { source })?;

    validate_input(&input).map_err(|source| PipelineError::InputRejected { source })?;
    if let Some(diagram) = &input.diagram {
        check_diagram(diagram).map_err(|source| PipelineError::InputRejected { source })?;
    }

    tracing::debug!(
        "Loaded input: {} flow(s), {} boundary(ies), diagram: {}",
        input.flows.len(),
        input.boundaries.len(),
        input.has_diagram()
    );

    Ok(LoadedInput {
        input,
        source: config.model.clone(),
    })
}
