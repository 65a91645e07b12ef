//! Report generation for threat models.
//!
//! This module provides multiple output formats for an analyzed model:
//! - Summary: Compact, colored shell-friendly output
//! - Table: Aligned tabular terminal output
//! - JSON: Structured data for programmatic integration
//! - Markdown: Threats grouped by DFD element, for design documents
//! - SARIF: CI/CD security dashboard integration
//! - CSV: Spreadsheet import
//!
//! # Security
//!
//! Descriptions, element names and data types come straight from user
//! input. The `escape` module provides the helpers used before embedding
//! them in Markdown or CSV.

mod csv;
pub mod escape;
mod json;
mod markdown;
mod sarif;
mod summary;
mod types;

pub use csv::CsvReporter;
pub use json::JsonReporter;
pub use markdown::MarkdownReporter;
pub use sarif::SarifReporter;
pub use summary::{SummaryReporter, TableReporter};
pub use types::{ReportConfig, ReportFormat, ReportMetadata};

use crate::error::{ReportErrorKind, StrideError};
use crate::model::{AnalysisInput, ThreatModel};
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(ReportFormat),
}

impl From<ReportError> for StrideError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::IoError(e) => e.into(),
            ReportError::SerializationError(msg) => {
                Self::report("serializing report", ReportErrorKind::JsonSerializationError(msg))
            }
            ReportError::FormatError(e) => Self::report(
                "formatting report",
                ReportErrorKind::UnsupportedFormat(e.to_string()),
            ),
            ReportError::UnsupportedFormat(format) => Self::report(
                "selecting reporter",
                ReportErrorKind::UnsupportedFormat(format.to_string()),
            ),
        }
    }
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Generate a report for an analyzed model
    fn generate(
        &self,
        input: &AnalysisInput,
        model: &ThreatModel,
        config: &ReportConfig,
    ) -> Result<String, ReportError>;

    /// Write report to a writer
    fn write_report(
        &self,
        input: &AnalysisInput,
        model: &ThreatModel,
        config: &ReportConfig,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let report = self.generate(input, model, config)?;
        writer.write_all(report.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    create_reporter_with_options(format, true)
}

/// Create a report generator with color control
///
/// `Auto` should be resolved by the caller; it is treated as `Summary` here.
#[must_use]
pub fn create_reporter_with_options(
    format: ReportFormat,
    use_color: bool,
) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Auto | ReportFormat::Summary => {
            if use_color {
                Box::new(SummaryReporter::new())
            } else {
                Box::new(SummaryReporter::new().no_color())
            }
        }
        ReportFormat::Table => {
            if use_color {
                Box::new(TableReporter::new())
            } else {
                Box::new(TableReporter::new().no_color())
            }
        }
        ReportFormat::Json => Box::new(JsonReporter::new()),
        ReportFormat::Markdown => Box::new(MarkdownReporter::new()),
        ReportFormat::Sarif => Box::new(SarifReporter::new()),
        ReportFormat::Csv => Box::new(CsvReporter::new()),
    }
}
