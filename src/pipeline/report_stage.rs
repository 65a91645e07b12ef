//! Report output stage.

use super::{auto_detect_format, should_use_color, write_output, OutputTarget, PipelineError};
use crate::config::AnalyzeConfig;
use crate::model::{AnalysisInput, ThreatModel};
use crate::reports::{create_reporter_with_options, ReportConfig, ReportMetadata};

/// Report settings derived from the analyze configuration.
#[must_use]
pub fn build_report_config(config: &AnalyzeConfig) -> ReportConfig {
    let mut metadata = ReportMetadata::now();
    if let Some(model) = &config.model {
        metadata = metadata.with_model_path(model.display().to_string());
    }
    ReportConfig::default().with_metadata(metadata)
}

/// Generate the report and write it to the configured destination.
pub fn output_report(
    config: &AnalyzeConfig,
    input: &AnalysisInput,
    model: &ThreatModel,
) -> Result<(), PipelineError> {
    let output_target = OutputTarget::from_option(config.output.file.clone());
    let effective_output = auto_detect_format(config.output.format, &output_target);
    let use_color = should_use_color(config.output.no_color) && output_target.is_terminal();

    tracing::debug!("Writing {effective_output} report");
    let reporter = create_reporter_with_options(effective_output, use_color);
    let report = reporter
        .generate(input, model, &build_report_config(config))
        .map_err(|e| PipelineError::ReportFailed { source: e.into() })?;

    write_output(&report, &output_target, config.behavior.quiet)
        .map_err(|source| PipelineError::ReportFailed { source })
}
