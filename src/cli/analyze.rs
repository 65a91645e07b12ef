//! Analyze command handler.
//!
//! Implements the `analyze` subcommand: load a threat model, infer STRIDE
//! threats and write the report (and optionally a diagram).

use crate::config::AnalyzeConfig;
use crate::model::ThreatModel;
use crate::pipeline::{
    build_engine, exit_codes, explain_features, load_input, output_diagram, output_report,
};
use anyhow::Result;

/// Run the analyze command, returning the desired exit code.
///
/// Pipeline failures surface as [`crate::pipeline::PipelineError`] inside
/// the returned error so the caller can pick the exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_analyze(config: AnalyzeConfig) -> Result<i32> {
    let quiet = config.behavior.quiet;

    let loaded = load_input(&config)?;
    let engine = build_engine(&config)?;

    if config.behavior.explain && !quiet {
        eprint!("{}", explain_features(&engine, &loaded.input));
    }

    let model = engine.analyze(&loaded.input);
    if !quiet {
        tracing::info!(
            "Identified {} threat(s) across {} element(s)",
            model.len(),
            model.group_by_element().len()
        );
    }

    output_report(&config, &loaded.input, &model)?;
    output_diagram(&config, &loaded.input, &model);

    Ok(determine_exit_code(&config, &model))
}

/// Determine the appropriate exit code based on the model and config flags.
fn determine_exit_code(config: &AnalyzeConfig, model: &ThreatModel) -> i32 {
    if config.behavior.fail_on_threats && !model.is_empty() {
        exit_codes::THREATS_FOUND
    } else {
        exit_codes::SUCCESS
    }
}
