//! Init command handler.
//!
//! Writes a starter threat model for a system the user then edits.

use crate::parsers::example_model_yaml;
use crate::pipeline::exit_codes;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Configuration for the init command
#[derive(Debug, Clone)]
pub struct InitConfig {
    pub path: PathBuf,
    pub force: bool,
    pub quiet: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("threat-model.yaml"),
            force: false,
            quiet: false,
        }
    }
}

/// Write the starter model, refusing to clobber an existing file.
#[allow(clippy::needless_pass_by_value)]
pub fn run_init(config: InitConfig) -> Result<i32> {
    if config.path.exists() && !config.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config.path.display()
        );
    }

    std::fs::write(&config.path, example_model_yaml())
        .with_context(|| format!("Failed to write {}", config.path.display()))?;

    if !config.quiet {
        eprintln!("Created threat model: {}", config.path.display());
        eprintln!("Run `stride-tools analyze {}` to list its threats.", config.path.display());
    }
    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_model;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_parseable_model() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("model.yaml");
        let config = InitConfig {
            path: path.clone(),
            force: false,
            quiet: true,
        };
        assert_eq!(run_init(config.clone()).unwrap(), exit_codes::SUCCESS);

        let input = parse_model(&path).unwrap();
        assert!(input.has_description());

        assert!(run_init(config.clone()).is_err());
        assert!(run_init(InitConfig { force: true, ..config }).is_ok());
    }
}
