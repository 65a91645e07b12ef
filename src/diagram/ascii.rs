//! Plain-text diagram, used when no image renderer is available.

use super::dot::node_in_boundary;
use super::index::{threat_labels, ElementIndex};
use super::{DiagramContext, DiagramError, DiagramFormat, DiagramRenderer};
use crate::model::{AnalysisInput, Threat, ThreatModel};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

/// Pad `text` with spaces to `width` terminal columns.
fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

/// Textual data-flow diagram with a threat legend.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiRenderer;

impl AsciiRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn to_text(
        &self,
        ctx: &DiagramContext,
        input: &AnalysisInput,
        model: &ThreatModel,
    ) -> Result<String, DiagramError> {
        let index = ElementIndex::from_threats(&model.threats);
        let nodes = input.flow_nodes();
        let mut out = String::new();

        let heading = format!("{} (Generated on: {})", ctx.title, ctx.generated_on);
        writeln!(out, "{heading}")?;
        writeln!(out, "{}", "=".repeat(UnicodeWidthStr::width(heading.as_str())))?;

        if !nodes.is_empty() {
            writeln!(out)?;
            writeln!(out, "Nodes:")?;
            let width = nodes.iter().map(|n| UnicodeWidthStr::width(*n)).max().unwrap_or(0) + 2;
            for node in &nodes {
                writeln!(
                    out,
                    "  {}  Threats: {}",
                    pad(&format!("[{node}]"), width),
                    threat_labels(index.node(node))
                )?;
            }

            writeln!(out)?;
            writeln!(out, "Data Flows:")?;
            for flow in &input.flows {
                writeln!(out, "  {} --({})--> {}", flow.source, flow.data_type, flow.destination)?;
                writeln!(out, "      Threats: {}", threat_labels(index.edge(&flow.edge_label())))?;
            }
        }

        if !input.boundaries.is_empty() {
            writeln!(out)?;
            writeln!(out, "Trust Boundaries:")?;
            for boundary in &input.boundaries {
                if boundary.description.is_empty() {
                    writeln!(out, "  ---- {} ----", boundary.name)?;
                } else {
                    writeln!(out, "  ---- {} ({}) ----", boundary.name, boundary.description)?;
                }
                let members: Vec<&str> = nodes
                    .iter()
                    .copied()
                    .filter(|n| node_in_boundary(n, boundary))
                    .collect();
                if !members.is_empty() {
                    writeln!(out, "      Contains: {}", members.join(", "))?;
                }
                writeln!(out, "      Threats: {}", threat_labels(index.node(&boundary.name)))?;
            }
        }

        let others: Vec<(&str, &[&Threat])> = index
            .nodes()
            .filter(|(name, _)| {
                !nodes.contains(name) && !input.boundaries.iter().any(|b| b.name == *name)
            })
            .collect();
        if !others.is_empty() {
            writeln!(out)?;
            writeln!(out, "Other Elements:")?;
            for (name, threats) in others {
                writeln!(out, "  {name}: {}", threat_labels(threats))?;
            }
        }

        writeln!(out)?;
        self.write_legend(&mut out, &model.threats)?;
        Ok(out)
    }

    fn write_legend(&self, out: &mut String, threats: &[Threat]) -> Result<(), DiagramError> {
        let rows: Vec<(String, String)> = threats
            .iter()
            .map(|t| (t.id.to_string(), format!("{}: {}", t.category, t.description)))
            .collect();

        let id_width = rows
            .iter()
            .map(|(id, _)| id.len())
            .chain(std::iter::once("ID".len()))
            .max()
            .unwrap_or(2);
        let text_width = rows
            .iter()
            .map(|(_, text)| UnicodeWidthStr::width(text.as_str()))
            .chain(std::iter::once("Threat Description".len()))
            .max()
            .unwrap_or(0);
        let rule = format!("+-{}-+-{}-+", "-".repeat(id_width), "-".repeat(text_width));

        writeln!(out, "Threat Legend:")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "| {} | {} |", pad("ID", id_width), pad("Threat Description", text_width))?;
        writeln!(out, "{rule}")?;
        if rows.is_empty() {
            writeln!(out, "| {} | {} |", pad("-", id_width), pad("No threats identified", text_width))?;
        }
        for (id, text) in &rows {
            writeln!(out, "| {} | {} |", pad(id, id_width), pad(text, text_width))?;
        }
        writeln!(out, "{rule}")?;
        Ok(())
    }
}

impl DiagramRenderer for AsciiRenderer {
    fn format(&self) -> DiagramFormat {
        DiagramFormat::Ascii
    }

    fn render(
        &self,
        ctx: &DiagramContext,
        input: &AnalysisInput,
        model: &ThreatModel,
    ) -> Result<Vec<u8>, DiagramError> {
        Ok(self.to_text(ctx, input, model)?.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::model::{DataFlow, TrustBoundary};

    #[test]
    fn test_ascii_sections_and_legend() {
        let input = AnalysisInput::new("login")
            .with_flow(DataFlow::new("User", "API", "PII"))
            .with_boundary(TrustBoundary::new("DMZ", "user zone"));
        let model = analyze(&input);
        let ctx = DiagramContext::fixed("Data Flow Diagram", "2024-01-01 12:00:00");
        let text = AsciiRenderer::new().to_text(&ctx, &input, &model).unwrap();

        assert!(text.starts_with("Data Flow Diagram (Generated on: 2024-01-01 12:00:00)\n"));
        assert!(text.contains("User --(PII)--> API"));
        assert!(text.contains("---- DMZ (user zone) ----"));
        assert!(text.contains("Contains: User"));
        assert!(text.contains("System: T1: Spoofing, T2: Repudiation"));
        assert!(text.contains("| ID "));
        assert!(text.contains("| T1 | Spoofing: Attackers may impersonate"));
    }

    #[test]
    fn test_legend_rows_align() {
        let input = AnalysisInput::new("login");
        let model = analyze(&input);
        let ctx = DiagramContext::fixed("DFD", "now");
        let text = AsciiRenderer::new().to_text(&ctx, &input, &model).unwrap();
        let widths: Vec<usize> = text
            .lines()
            .filter(|l| l.starts_with('|') || l.starts_with('+'))
            .map(UnicodeWidthStr::width)
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_empty_model_legend() {
        let input = AnalysisInput::new("calculator");
        let model = analyze(&input);
        let text = AsciiRenderer::new()
            .to_text(&DiagramContext::fixed("DFD", "now"), &input, &model)
            .unwrap();
        assert!(text.contains("No threats identified"));
        assert!(!text.contains("Nodes:"));
    }
}
