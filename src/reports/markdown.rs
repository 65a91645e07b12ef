//! Markdown report generator.

use super::escape::{escape_markdown_inline, escape_markdown_list, escape_markdown_table};
use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::model::{AnalysisInput, StrideCategory, ThreatModel};
use std::fmt::Write;

/// Markdown reporter: summary tables followed by threats grouped by DFD element.
pub struct MarkdownReporter {
    /// Emit the detected features and declared elements before the threats
    include_context: bool,
}

impl MarkdownReporter {
    /// Create a new Markdown reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            include_context: true,
        }
    }

    #[must_use]
    pub const fn include_context(mut self, include: bool) -> Self {
        self.include_context = include;
        self
    }

    fn write_context(&self, md: &mut String, input: &AnalysisInput, model: &ThreatModel) -> Result<(), ReportError> {
        writeln!(md, "## System")?;
        writeln!(md)?;
        if input.has_description() {
            writeln!(md, "> {}", escape_markdown_inline(input.description.trim()))?;
            writeln!(md)?;
        }

        let features: Vec<&str> = model.features.enabled().iter().map(|f| f.name()).collect();
        if features.is_empty() {
            writeln!(md, "**Detected features:** none")?;
        } else {
            writeln!(md, "**Detected features:** {}", features.join(", "))?;
        }
        if let Some(diagram) = &input.diagram {
            writeln!(md, "**Diagram:** {}", escape_markdown_inline(&diagram.display_name()))?;
        }
        writeln!(md)?;

        if !input.flows.is_empty() {
            writeln!(md, "### Data Flows")?;
            writeln!(md)?;
            writeln!(md, "| # | Source | Destination | Data Type |")?;
            writeln!(md, "|---|--------|-------------|-----------|")?;
            for (i, flow) in input.flows.iter().enumerate() {
                writeln!(
                    md,
                    "| {} | {} | {} | {} |",
                    i + 1,
                    escape_markdown_table(&flow.source),
                    escape_markdown_table(&flow.destination),
                    escape_markdown_table(&flow.data_type)
                )?;
            }
            writeln!(md)?;
        }

        if !input.boundaries.is_empty() {
            writeln!(md, "### Trust Boundaries")?;
            writeln!(md)?;
            for boundary in &input.boundaries {
                if boundary.description.is_empty() {
                    writeln!(md, "- **{}**", escape_markdown_list(&boundary.name))?;
                } else {
                    writeln!(
                        md,
                        "- **{}**: {}",
                        escape_markdown_list(&boundary.name),
                        escape_markdown_list(&boundary.description)
                    )?;
                }
            }
            writeln!(md)?;
        }
        Ok(())
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for MarkdownReporter {
    fn generate(
        &self,
        input: &AnalysisInput,
        model: &ThreatModel,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut md = String::new();

        writeln!(md, "# {}", escape_markdown_inline(config.title_or_default()))?;
        writeln!(md)?;
        writeln!(
            md,
            "Generated by {} v{} on {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            config.metadata.timestamp()
        )?;
        if let Some(path) = &config.metadata.model_path {
            writeln!(md)?;
            writeln!(md, "Model: `{}`", path.replace('`', "'"))?;
        }
        writeln!(md)?;

        if self.include_context {
            self.write_context(&mut md, input, model)?;
        }

        writeln!(md, "## Summary")?;
        writeln!(md)?;
        writeln!(md, "| Category | Property | Threats |")?;
        writeln!(md, "|----------|----------|---------|")?;
        for category in StrideCategory::ALL {
            writeln!(
                md,
                "| {} | {} | {} |",
                category,
                category.violated_property(),
                model.summary.count(category)
            )?;
        }
        writeln!(md, "| **Total** | | **{}** |", model.summary.total)?;
        writeln!(md)?;

        writeln!(md, "## Threats")?;
        writeln!(md)?;
        if model.is_empty() {
            writeln!(md, "No threats identified.")?;
            return Ok(md);
        }

        for (element, threats) in model.group_by_element() {
            writeln!(md, "### {}", escape_markdown_inline(element))?;
            writeln!(md)?;
            for threat in threats {
                writeln!(
                    md,
                    "- **{} ({})**: {}",
                    threat.id,
                    threat.category,
                    escape_markdown_list(&threat.description)
                )?;
                writeln!(md, "  - Mitigation: {}", escape_markdown_list(&threat.mitigation))?;
                if let Some(controls) = &threat.controls {
                    writeln!(md, "  - Controls: {}", escape_markdown_list(controls))?;
                }
                writeln!(md, "  - ASVS: {}", escape_markdown_list(&threat.asvs))?;
                writeln!(md, "  - SAMM: {}", escape_markdown_list(&threat.samm))?;
                writeln!(md, "  - Rule: `{}`", threat.rule_id)?;
            }
            writeln!(md)?;
        }

        Ok(md)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Markdown
    }
}
