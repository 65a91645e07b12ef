//! Data-flow diagram rendering.
//!
//! Rendering is decoupled from inference: renderers consume the analysis
//! input and a finished [`ThreatModel`] and never change it. Nodes come from
//! flow endpoints, edges from flows, clusters from trust boundaries, and each
//! element is labelled with the threats attached to it.
//!
//! - [`DotRenderer`]: Graphviz DOT source
//! - [`GraphvizRenderer`]: PNG/SVG through the `dot` executable
//! - [`AsciiRenderer`]: plain-text fallback with a threat legend
//!
//! [`render_with_fallback`] degrades to ASCII on any failure.

mod ascii;
mod dot;
mod graphviz;
mod index;

pub use ascii::AsciiRenderer;
pub use dot::{node_in_boundary, DotRenderer};
pub use graphviz::GraphvizRenderer;
pub use index::{is_edge, threat_labels, ElementIndex};

use crate::model::{AnalysisInput, ThreatModel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while rendering a diagram
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Graphviz executable '{0}' not found")]
    GraphvizNotFound(String),

    #[error("Graphviz exited with {status}: {stderr}")]
    GraphvizFailed { status: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Unsupported diagram format: {0}")]
    Unsupported(String),
}

/// Diagram output format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFormat {
    /// Graphviz DOT source
    Dot,
    /// Plain-text diagram and legend
    #[default]
    Ascii,
    /// PNG image (requires Graphviz)
    Png,
    /// SVG image (requires Graphviz)
    Svg,
}

impl DiagramFormat {
    /// File extension, also the Graphviz `-T` argument.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Ascii => "txt",
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    #[must_use]
    pub const fn needs_graphviz(&self) -> bool {
        matches!(self, Self::Png | Self::Svg)
    }

    /// Guess the format from an output path's extension.
    #[must_use]
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "dot" | "gv" => Some(Self::Dot),
            "txt" => Some(Self::Ascii),
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }
}

impl fmt::Display for DiagramFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dot => write!(f, "dot"),
            Self::Ascii => write!(f, "ascii"),
            Self::Png => write!(f, "png"),
            Self::Svg => write!(f, "svg"),
        }
    }
}

/// Title block shown on every diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramContext {
    pub title: String,
    pub generated_on: String,
}

impl DiagramContext {
    /// Context stamped with the current local time.
    #[must_use]
    pub fn now(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            generated_on: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Context with an explicit timestamp.
    #[must_use]
    pub fn fixed(title: impl Into<String>, generated_on: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            generated_on: generated_on.into(),
        }
    }
}

/// Trait for diagram renderers
pub trait DiagramRenderer {
    /// Format this renderer produces
    fn format(&self) -> DiagramFormat;

    /// Render the diagram to bytes
    fn render(
        &self,
        ctx: &DiagramContext,
        input: &AnalysisInput,
        model: &ThreatModel,
    ) -> Result<Vec<u8>, DiagramError>;
}

/// Create a renderer for the given format.
#[must_use]
pub fn create_renderer(format: DiagramFormat, graphviz_binary: &str) -> Box<dyn DiagramRenderer> {
    match format {
        DiagramFormat::Dot => Box::new(DotRenderer::new()),
        DiagramFormat::Ascii => Box::new(AsciiRenderer::new()),
        DiagramFormat::Png | DiagramFormat::Svg => match GraphvizRenderer::new(graphviz_binary, format) {
            Ok(renderer) => Box::new(renderer),
            Err(_) => Box::new(AsciiRenderer::new()),
        },
    }
}

/// Output of [`render_with_fallback`].
#[derive(Debug, Clone)]
pub struct RenderedDiagram {
    /// Format actually produced
    pub format: DiagramFormat,
    pub bytes: Vec<u8>,
    /// Why the requested format was abandoned, if it was
    pub fallback_reason: Option<String>,
}

impl RenderedDiagram {
    #[must_use]
    pub const fn fell_back(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Render in the requested format, degrading to ASCII on failure.
///
/// The ASCII renderer only writes into memory, so the fallback path cannot
/// fail in practice; if it somehow does, the error is returned.
pub fn render_with_fallback(
    format: DiagramFormat,
    graphviz_binary: &str,
    ctx: &DiagramContext,
    input: &AnalysisInput,
    model: &ThreatModel,
) -> Result<RenderedDiagram, DiagramError> {
    let renderer = create_renderer(format, graphviz_binary);
    match renderer.render(ctx, input, model) {
        Ok(bytes) => Ok(RenderedDiagram {
            format: renderer.format(),
            bytes,
            fallback_reason: None,
        }),
        Err(err) if format != DiagramFormat::Ascii => {
            tracing::warn!("{err}. Falling back to ASCII diagram with numbered threat IDs.");
            let bytes = AsciiRenderer::new().render(ctx, input, model)?;
            Ok(RenderedDiagram {
                format: DiagramFormat::Ascii,
                bytes,
                fallback_reason: Some(err.to_string()),
            })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::model::DataFlow;
    use std::path::Path;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DiagramFormat::from_path(Path::new("dfd.PNG")), Some(DiagramFormat::Png));
        assert_eq!(DiagramFormat::from_path(Path::new("dfd.gv")), Some(DiagramFormat::Dot));
        assert_eq!(DiagramFormat::from_path(Path::new("dfd")), None);
    }

    #[test]
    fn test_fallback_when_graphviz_missing() {
        let input = AnalysisInput::new("api").with_flow(DataFlow::new("User", "API", "PII"));
        let model = analyze(&input);
        let ctx = DiagramContext::fixed("DFD", "now");

        let rendered = render_with_fallback(
            DiagramFormat::Png,
            "stride-tools-no-such-graphviz-binary",
            &ctx,
            &input,
            &model,
        )
        .unwrap();
        assert!(rendered.fell_back());
        assert_eq!(rendered.format, DiagramFormat::Ascii);
        assert!(String::from_utf8(rendered.bytes).unwrap().contains("Threat Legend:"));
    }

    #[test]
    fn test_dot_needs_no_fallback() {
        let input = AnalysisInput::new("api");
        let model = analyze(&input);
        let rendered = render_with_fallback(
            DiagramFormat::Dot,
            "dot",
            &DiagramContext::fixed("DFD", "now"),
            &input,
            &model,
        )
        .unwrap();
        assert!(!rendered.fell_back());
        assert_eq!(rendered.format, DiagramFormat::Dot);
    }

    #[test]
    fn test_context_now_has_timestamp() {
        let ctx = DiagramContext::now("DFD");
        assert_eq!(ctx.generated_on.len(), "2024-01-01 00:00:00".len());
    }
}
