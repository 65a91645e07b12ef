//! Summary and table report generators for shell output.
//!
//! Provides compact, human-readable output for terminal usage.

use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::model::{AnalysisInput, StrideCategory, ThreatModel};

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Color used for a STRIDE category in terminal output.
const fn category_color(category: StrideCategory) -> &'static str {
    match category {
        StrideCategory::Spoofing | StrideCategory::Tampering | StrideCategory::ElevationOfPrivilege => "red",
        StrideCategory::InformationDisclosure | StrideCategory::DenialOfService => "yellow",
        StrideCategory::Repudiation => "cyan",
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Summary reporter for shell output
pub struct SummaryReporter {
    /// Use colored output
    colored: bool,
}

impl SummaryReporter {
    /// Create a new summary reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for SummaryReporter {
    fn generate(
        &self,
        input: &AnalysisInput,
        model: &ThreatModel,
        config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();

        // Header
        lines.push(self.color(config.title_or_default(), "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));

        if let Some(path) = &config.metadata.model_path {
            lines.push(format!("{}     {path}", self.color("Model:", "cyan")));
        }

        let features: Vec<&str> = model.features.enabled().iter().map(|f| f.name()).collect();
        lines.push(format!(
            "{}  {}",
            self.color("Features:", "cyan"),
            if features.is_empty() {
                "none".to_string()
            } else {
                features.join(", ")
            }
        ));

        let flows = input.flows.len();
        let boundaries = input.boundaries.len();
        lines.push(format!(
            "{}  {flows} {}, {boundaries} {}{}",
            self.color("Elements:", "cyan"),
            plural(flows, "flow", "flows"),
            plural(boundaries, "boundary", "boundaries"),
            if input.has_diagram() { ", diagram" } else { "" }
        ));

        lines.push(String::new());

        if model.is_empty() {
            lines.push(self.color("✓ No threats identified", "green"));
            return Ok(lines.join("\n"));
        }

        // Categories
        lines.push(self.color("Threats by category:", "bold"));
        for (category, count) in &model.summary.by_category {
            if *count == 0 {
                continue;
            }
            lines.push(format!(
                "  {} {:<24} {count}",
                self.color(&category.code().to_string(), category_color(*category)),
                category.name()
            ));
        }

        lines.push(String::new());

        // Elements
        lines.push(self.color("Threats by element:", "bold"));
        for (element, threats) in model.group_by_element() {
            let ids: Vec<String> = threats.iter().map(|t| t.id.to_string()).collect();
            lines.push(format!("  {:<32} {}", truncate(element, 32), ids.join(", ")));
        }

        lines.push(String::new());
        lines.push(format!(
            "{} {} {}",
            self.color("⚠", "yellow"),
            self.color(&model.summary.total.to_string(), "bold"),
            plural(model.summary.total, "threat identified", "threats identified")
        ));

        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Summary
    }
}

/// Table reporter for aligned terminal output
pub struct TableReporter {
    /// Use colored output
    colored: bool,
}

impl TableReporter {
    /// Create a new table reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    /// Pad before coloring so escape codes do not break alignment.
    fn cell(&self, text: &str, width: usize, color: &str) -> String {
        self.color(&format!("{:<width$}", truncate(text, width)), color)
    }
}

impl Default for TableReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for TableReporter {
    fn generate(
        &self,
        _input: &AnalysisInput,
        model: &ThreatModel,
        _config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut lines = Vec::new();

        // Header
        lines.push(format!(
            "{} {} {} {}",
            self.cell("ID", 5, "bold"),
            self.cell("CATEGORY", 24, "bold"),
            self.cell("ELEMENT", 30, "bold"),
            self.color("DESCRIPTION", "bold")
        ));
        lines.push("─".repeat(110));

        for threat in &model.threats {
            lines.push(format!(
                "{} {} {} {}",
                self.cell(&threat.id.to_string(), 5, "dim"),
                self.cell(threat.category.name(), 24, category_color(threat.category)),
                self.cell(&threat.dfd_element, 30, ""),
                truncate(&threat.description, 48)
            ));
        }

        // Summary footer
        lines.push(String::new());
        let counts: Vec<String> = StrideCategory::ALL
            .iter()
            .map(|c| format!("{}:{}", c.code(), model.summary.count(*c)))
            .collect();
        lines.push(format!("Total: {} | {}", model.summary.total, counts.join(" ")));

        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Table
    }
}

/// Truncate a string to fit within `max_len` (UTF-8 safe)
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let end = floor_char_boundary(s, max_len - 3);
        format!("{}...", &s[..end])
    } else {
        let end = floor_char_boundary(s, max_len);
        s[..end].to_string()
    }
}

/// Find the largest byte index <= `index` that is a valid UTF-8 char boundary.
const fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}
