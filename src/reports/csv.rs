//! CSV report generator.
//!
//! One row per threat, suitable for spreadsheet import and tracking in
//! risk registers.

use super::escape::escape_csv;
use super::{ReportConfig, ReportError, ReportFormat, ReportGenerator};
use crate::model::{AnalysisInput, ThreatModel};
use std::fmt::Write;

const CSV_HEADER: &str = "id,type,stride,dfdElement,description,mitigation,controls,asvs,samm,ruleId,origin";

/// CSV report generator.
pub struct CsvReporter;

impl CsvReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for CsvReporter {
    fn generate(
        &self,
        _input: &AnalysisInput,
        model: &ThreatModel,
        _config: &ReportConfig,
    ) -> Result<String, ReportError> {
        let mut content = String::new();
        writeln!(content, "{CSV_HEADER}")?;

        for threat in &model.threats {
            writeln!(
                content,
                "{},{},{},{},{},{},{},{},{},{},{}",
                threat.id,
                escape_csv(threat.category.name()),
                threat.category.code(),
                escape_csv(&threat.dfd_element),
                escape_csv(&threat.description),
                escape_csv(&threat.mitigation),
                escape_csv(threat.controls.as_deref().unwrap_or("")),
                escape_csv(&threat.asvs),
                escape_csv(&threat.samm),
                threat.rule_id,
                threat.origin
            )?;
        }

        Ok(content)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }
}
