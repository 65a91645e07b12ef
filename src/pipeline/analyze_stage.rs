//! Rule loading and analysis stage.

use super::PipelineError;
use crate::analysis::ThreatEngine;
use crate::config::{AnalysisConfig, AnalyzeConfig, RulesPathConfig};
use crate::model::AnalysisInput;
use crate::rules::{CustomRulesConfig, RuleTable};

/// Build the effective rule table: built-ins plus the custom rules file.
pub fn load_rule_table(
    analysis: &AnalysisConfig,
    rules: &RulesPathConfig,
) -> Result<RuleTable, PipelineError> {
    let table = RuleTable::builtin(&analysis.catalog_options());
    let Some(path) = &rules.path else {
        return Ok(table);
    };

    let custom = CustomRulesConfig::from_file(path)
        .map_err(|source| PipelineError::RulesFailed { source })?;
    tracing::info!("Loaded custom rules from {}: {}", path.display(), custom.summary());

    table
        .with_custom(&custom)
        .map_err(|source| PipelineError::RulesFailed { source })
}

/// Engine configured for an analyze run.
pub fn build_engine(config: &AnalyzeConfig) -> Result<ThreatEngine, PipelineError> {
    let table = load_rule_table(&config.analysis, &config.rules)?;
    tracing::debug!("Rule table holds {} rule(s)", table.len());
    Ok(ThreatEngine::with_rules(table).diagram_stage(config.analysis.diagram_stage))
}

/// One line per feature with the keyword that triggered it.
#[must_use]
pub fn explain_features(engine: &ThreatEngine, input: &AnalysisInput) -> String {
    let mut out = String::from("Detected features:\n");
    for evidence in engine.explain(input) {
        match &evidence.keyword {
            Some(keyword) => out.push_str(&format!(
                "  + {:<15} (matched \"{keyword}\")\n",
                evidence.feature.name()
            )),
            None => out.push_str(&format!("  - {}\n", evidence.feature.name())),
        }
    }
    out
}
