//! Data-flow diagram output stage.
//!
//! Diagram problems never fail the run: rendering degrades to ASCII and
//! write errors are reported as warnings.

use super::write_bytes;
use crate::config::AnalyzeConfig;
use crate::diagram::{render_with_fallback, DiagramContext, DiagramFormat};
use crate::model::{AnalysisInput, ThreatModel};
use std::path::{Path, PathBuf};

/// Configured format, else the one implied by the file extension, else ASCII.
#[must_use]
pub fn resolve_diagram_format(configured: Option<DiagramFormat>, path: &Path) -> DiagramFormat {
    configured
        .or_else(|| DiagramFormat::from_path(path))
        .unwrap_or_default()
}

/// Render and write the diagram if a destination is configured.
///
/// Returns the path actually written. After a fallback to ASCII the
/// extension is switched to `.txt` so an image path never holds text.
pub fn output_diagram(
    config: &AnalyzeConfig,
    input: &AnalysisInput,
    model: &ThreatModel,
) -> Option<PathBuf> {
    let path = config.diagram.file.as_ref()?;
    let format = resolve_diagram_format(config.diagram.format, path);
    let ctx = DiagramContext::now(config.diagram.title.clone());

    let rendered = match render_with_fallback(format, &config.diagram.graphviz_binary, &ctx, input, model) {
        Ok(rendered) => rendered,
        Err(err) => {
            tracing::warn!("Diagram rendering failed: {err}");
            return None;
        }
    };

    let target = if rendered.fell_back() {
        path.with_extension(rendered.format.extension())
    } else {
        path.clone()
    };

    match write_bytes(&rendered.bytes, &target, config.behavior.quiet) {
        Ok(()) => Some(target),
        Err(err) => {
            tracing::warn!("{err:#}");
            None
        }
    }
}
