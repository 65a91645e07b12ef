//! Image rendering through the Graphviz `dot` executable.

use super::dot::DotRenderer;
use super::{DiagramContext, DiagramError, DiagramFormat, DiagramRenderer};
use crate::model::{AnalysisInput, ThreatModel};
use std::io::Write;
use std::process::{Command, Stdio};

/// Pipes DOT source through `dot -T<format>`.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    binary: String,
    format: DiagramFormat,
}

impl GraphvizRenderer {
    /// Renderer for PNG or SVG output.
    pub fn new(binary: impl Into<String>, format: DiagramFormat) -> Result<Self, DiagramError> {
        if !format.needs_graphviz() {
            return Err(DiagramError::Unsupported(format!(
                "graphviz cannot produce '{format}' output"
            )));
        }
        Ok(Self {
            binary: binary.into(),
            format,
        })
    }

    /// Run the executable on DOT source.
    pub fn run(&self, dot: &str) -> Result<Vec<u8>, DiagramError> {
        let mut child = Command::new(&self.binary)
            .arg(format!("-T{}", self.format.extension()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => DiagramError::GraphvizNotFound(self.binary.clone()),
                _ => DiagramError::Io(e),
            })?;

        let written = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(dot.as_bytes()));

        // stdin is closed by now, so the child always exits and is reaped
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(DiagramError::GraphvizFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;
        if output.stdout.is_empty() {
            return Err(DiagramError::GraphvizFailed {
                status: output.status.to_string(),
                stderr: "no output produced".to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl DiagramRenderer for GraphvizRenderer {
    fn format(&self) -> DiagramFormat {
        self.format
    }

    fn render(
        &self,
        ctx: &DiagramContext,
        input: &AnalysisInput,
        model: &ThreatModel,
    ) -> Result<Vec<u8>, DiagramError> {
        let dot = DotRenderer::new().to_dot(ctx, input, model)?;
        tracing::debug!("Running {} for {} output", self.binary, self.format);
        self.run(&dot)
    }
}
