//! Rules command handler.
//!
//! Lists the effective rule catalogue, or only checks a custom rules file.

use crate::config::{AnalysisConfig, RulesPathConfig};
use crate::pipeline::{exit_codes, load_rule_table, write_output, OutputTarget};
use crate::rules::{RuleEntry, RuleTable};
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fmt::Write;
use std::path::PathBuf;

/// Listing format for the rule catalogue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RulesFormat {
    /// Aligned text table
    #[default]
    Table,
    /// JSON array of rule entries
    Json,
}

/// Configuration for the rules command
#[derive(Debug, Clone, Default)]
pub struct RulesConfig {
    pub analysis: AnalysisConfig,
    pub rules: RulesPathConfig,
    pub format: RulesFormat,
    /// Only validate the custom rules file
    pub check: bool,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

/// Run the rules command, returning the desired exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_rules(config: RulesConfig) -> Result<i32> {
    if config.check && config.rules.path.is_none() {
        anyhow::bail!("--check needs a rules file (--rules PATH or rules.path in the config)");
    }

    let table = load_rule_table(&config.analysis, &config.rules)?;

    if config.check {
        if !config.quiet {
            println!("Rules OK: {} rule(s) in the effective catalogue", table.len());
        }
        return Ok(exit_codes::SUCCESS);
    }

    let content = match config.format {
        RulesFormat::Table => format_table(&table)?,
        RulesFormat::Json => serde_json::to_string_pretty(&table.entries())
            .context("Failed to serialize rule catalogue")?,
    };
    write_output(&content, &OutputTarget::from_option(config.output), config.quiet)?;
    Ok(exit_codes::SUCCESS)
}

fn format_table(table: &RuleTable) -> Result<String> {
    let entries = table.entries();
    let id_width = entries.iter().map(|e| e.id.len()).max().unwrap_or(2).max(2);
    let mut out = String::new();

    writeln!(
        out,
        "{:<id_width$}  {:<8}  {:<22}  TRIGGER",
        "ID", "STAGE", "CATEGORY"
    )?;
    for RuleEntry {
        id,
        stage,
        category,
        trigger,
        ..
    } in &entries
    {
        writeln!(
            out,
            "{id:<id_width$}  {:<8}  {:<22}  {trigger}",
            stage.to_string(),
            category.to_string()
        )?;
    }
    write!(out, "\n{} rule(s), {} keyword(s)", entries.len(), table.keywords().len())?;
    Ok(out)
}
