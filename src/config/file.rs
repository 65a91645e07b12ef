//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::{AppConfig, ConfigOverlay};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".stride-tools.yaml",
    ".stride-tools.yml",
    "stride-tools.yaml",
    "stride-tools.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/stride-tools/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // 1. Use explicit path if provided
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    // 2. Search current directory
    if let Some(path) = std::env::current_dir().ok().and_then(|cwd| find_config_in_dir(&cwd)) {
        return Some(path);
    }

    // 3. Search git root (if in a repo)
    if let Some(path) = find_git_root().and_then(|root| find_config_in_dir(&root)) {
        return Some(path);
    }

    // 4. Search user config directory
    if let Some(path) = user_config_dir().and_then(|dir| find_config_in_dir(&dir)) {
        return Some(path);
    }

    // 5. Search home directory
    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// `~/.config/stride-tools` (platform equivalent).
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stride-tools"))
}

/// Where `config init` writes by default.
#[must_use]
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAMES[0])
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load a config layer from a YAML file.
///
/// Only the keys present in the file are set; an empty file sets nothing.
pub fn load_config_file(path: &Path) -> Result<ConfigOverlay, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(ConfigOverlay::default());
    }
    let config: ConfigOverlay = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load the discovered config file, or an empty layer.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (ConfigOverlay, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (ConfigOverlay::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (ConfigOverlay::default(), None)
            }
        },
    )
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# stride-tools configuration
# Place this file at .stride-tools.yaml in your project root or ~/.config/stride-tools/

{}
",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r"# stride-tools Configuration File
# ================================
#
# This file configures stride-tools behavior. Place it at:
#   - .stride-tools.yaml in your project root
#   - ~/.config/stride-tools/stride-tools.yaml for global config
#
# CLI arguments always override file settings.

# Rule catalogue and engine switches
analysis:
  # Add PUB-S/I/D-001 system rules for public-facing systems
  public_facing_overlay: true
  # Also raise spoofing for boundaries named 'frontend'
  boundary_frontend_spoofing: false
  # DoS system rule gating: api-or-web, exclude-public-web
  dos_rule: api-or-web
  # Emit component threats when a diagram is supplied
  diagram_stage: true

# Custom rules
rules:
  # Path to a custom rules YAML file
  path: null

# Report output
output:
  # Format: auto, summary, table, json, markdown, sarif, csv
  format: auto
  # Output file path (omit for stdout)
  # file: threats.json
  # Disable colored output
  no_color: false

# Data-flow diagram
diagram:
  # Format: ascii, dot, png, svg (png/svg need Graphviz).
  # Omit to infer it from the file extension, ascii otherwise.
  # format: svg
  # Diagram output path (omit to skip the diagram)
  # file: dfd.svg
  graphviz_binary: dot
  title: Data Flow Diagram

# Behavior flags
behavior:
  # Exit with code 1 if any threat is identified
  fail_on_threats: false
  # Suppress non-essential output
  quiet: false
  # Print the keyword behind each detected feature
  explain: false
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
