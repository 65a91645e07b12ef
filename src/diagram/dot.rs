//! Graphviz DOT source for the data-flow diagram.

use super::index::{threat_labels, ElementIndex};
use super::{DiagramContext, DiagramError, DiagramFormat, DiagramRenderer};
use crate::model::{AnalysisInput, ThreatModel, TrustBoundary};
use std::fmt::Write;

/// Node style: (shape, fill color, border color).
fn node_style(name: &str) -> (&'static str, &'static str, &'static str) {
    let lowered = name.to_lowercase();
    if lowered.contains("database") || lowered.contains("store") || lowered.contains("db") {
        ("cylinder", "lightblue", "blue")
    } else if lowered.contains("frontend") || lowered.contains("user") || lowered.contains("client") {
        ("oval", "lightcoral", "red")
    } else if lowered.contains("gateway") || lowered.contains("external") || lowered.contains("third") {
        ("oval", "lightgreen", "green")
    } else if lowered.contains("backend") || lowered.contains("server") || lowered.contains("api") {
        ("box", "lightblue", "blue")
    } else {
        ("box", "white", "black")
    }
}

/// Quote a DOT string; embedded newlines become `\n` line breaks.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whether a flow node sits inside a boundary.
///
/// A node belongs to a boundary when its case-folded name is one of the
/// words of the boundary description, or occurs inside the boundary name.
#[must_use]
pub fn node_in_boundary(node: &str, boundary: &TrustBoundary) -> bool {
    let node = node.to_lowercase();
    let description = boundary.description.to_lowercase();
    description
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|word| !word.is_empty() && word == node)
        || boundary.name.to_lowercase().contains(&node)
}

/// Renders DOT text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotRenderer;

impl DotRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build the DOT document.
    pub fn to_dot(
        &self,
        ctx: &DiagramContext,
        input: &AnalysisInput,
        model: &ThreatModel,
    ) -> Result<String, DiagramError> {
        let index = ElementIndex::from_threats(&model.threats);
        let nodes = input.flow_nodes();
        let mut dot = String::new();

        writeln!(dot, "digraph {{")?;
        writeln!(
            dot,
            "  graph [rankdir=TB, size=\"10,8\", fontname=\"Arial\", bgcolor=\"white\", splines=polyline, labelloc=t, fontsize=14, label={}];",
            quote(&format!("{}\nGenerated on: {}", ctx.title, ctx.generated_on))
        )?;
        writeln!(dot, "  node [fontname=\"Arial\", fontsize=12];")?;
        writeln!(dot, "  edge [fontname=\"Arial\", fontsize=10];")?;

        for node in &nodes {
            let threats = index.node(node);
            let (shape, fill, color) = node_style(node);
            writeln!(
                dot,
                "  {} [label={}, shape={shape}, style=filled, fillcolor={fill}, color={color}, penwidth={}];",
                quote(node),
                quote(&format!("{node}\nThreats: {}", threat_labels(threats))),
                if threats.is_empty() { 1 } else { 2 }
            )?;
        }

        for flow in &input.flows {
            let threats = index.edge(&flow.edge_label());
            writeln!(
                dot,
                "  {} -> {} [label={}, color={}, penwidth={}];",
                quote(&flow.source),
                quote(&flow.destination),
                quote(&format!("{}\nThreats: {}", flow.data_type, threat_labels(threats))),
                if threats.is_empty() { "black" } else { "red" },
                if threats.is_empty() { 1 } else { 2 }
            )?;
        }

        for (i, boundary) in input.boundaries.iter().enumerate() {
            writeln!(dot, "  subgraph cluster_{i} {{")?;
            writeln!(
                dot,
                "    graph [label={}, style=dashed, color=purple, fontname=\"Arial\", fontsize=12, penwidth=2];",
                quote(&format!(
                    "{}\nThreats: {}",
                    boundary.name,
                    threat_labels(index.node(&boundary.name))
                ))
            )?;
            for node in nodes.iter().filter(|n| node_in_boundary(n, boundary)) {
                writeln!(dot, "    {};", quote(node))?;
            }
            writeln!(dot, "  }}")?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

impl DiagramRenderer for DotRenderer {
    fn format(&self) -> DiagramFormat {
        DiagramFormat::Dot
    }

    fn render(
        &self,
        ctx: &DiagramContext,
        input: &AnalysisInput,
        model: &ThreatModel,
    ) -> Result<Vec<u8>, DiagramError> {
        Ok(self.to_dot(ctx, input, model)?.into_bytes())
    }
}
