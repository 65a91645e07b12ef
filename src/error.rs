//! Unified error types for stride-tools.
//!
//! This module provides the error hierarchy for the library, with rich
//! context for debugging and user-friendly messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for stride-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StrideError {
    /// Errors while collecting or validating analysis input
    #[error("Invalid threat model input: {context}")]
    Input {
        context: String,
        #[source]
        source: InputErrorKind,
    },

    /// Errors while building the rule table
    #[error("Invalid rule table: {context}")]
    Rules {
        context: String,
        #[source]
        source: RuleErrorKind,
    },

    /// Errors during report generation
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific input error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InputErrorKind {
    #[error("provide a description or diagram")]
    NothingToAnalyze,

    #[error("data flow #{index} is missing '{field}'")]
    MalformedFlow { index: usize, field: String },

    #[error("trust boundary #{index} is missing '{field}'")]
    MalformedBoundary { index: usize, field: String },

    #[error("Diagram not found: {0}")]
    DiagramNotFound(PathBuf),

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid YAML structure: {0}")]
    InvalidYaml(String),

    #[error("Unrecognized threat model format - expected YAML or JSON")]
    UnknownFormat,

    #[error("Invalid inline value '{value}': {reason}")]
    InvalidInline { value: String, reason: String },
}

/// Specific rule error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RuleErrorKind {
    #[error("Invalid regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("Unknown feature '{name}'{}", suggestion_suffix(.suggestion))]
    UnknownFeature {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Duplicate rule id '{0}'")]
    DuplicateRuleId(String),

    #[error("Cannot disable unknown rule '{0}'")]
    UnknownRuleId(String),

    #[error("Rule '{id}' is incomplete: {reason}")]
    Incomplete { id: String, reason: String },

    #[error("Failed to parse rules file: {0}")]
    InvalidFile(String),
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("JSON serialization failed: {0}")]
    JsonSerializationError(String),

    #[error("SARIF generation failed: {0}")]
    SarifError(String),

    #[error("Output format not supported for this operation: {0}")]
    UnsupportedFormat(String),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean '{s}'?)"))
        .unwrap_or_default()
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for stride-tools operations
pub type Result<T> = std::result::Result<T, StrideError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl StrideError {
    /// Create an input error with context
    pub fn input(context: impl Into<String>, source: InputErrorKind) -> Self {
        Self::Input {
            context: context.into(),
            source,
        }
    }

    /// The error raised when neither a description nor a diagram is given
    pub fn nothing_to_analyze() -> Self {
        Self::input("empty input", InputErrorKind::NothingToAnalyze)
    }

    /// Create a rule error with context
    pub fn rules(context: impl Into<String>, source: RuleErrorKind) -> Self {
        Self::Rules {
            context: context.into(),
            source,
        }
    }

    /// Create a report error
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error was caused by rejected user input.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::Input { .. } | Self::Validation(_))
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for StrideError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for StrideError {
    fn from(err: serde_json::Error) -> Self {
        Self::input("JSON deserialization", InputErrorKind::InvalidJson(err.to_string()))
    }
}

impl From<serde_yaml::Error> for StrideError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::input("YAML deserialization", InputErrorKind::InvalidYaml(err.to_string()))
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings are chained, so an error raised deep in input loading
/// reads `loading model.yaml: flows: data flow #2 is missing 'source'`.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<StrideError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: StrideError, new_ctx: &str) -> StrideError {
    match err {
        StrideError::Input {
            context: existing,
            source,
        } => StrideError::Input {
            context: chain_context(new_ctx, &existing),
            source,
        },
        StrideError::Rules {
            context: existing,
            source,
        } => StrideError::Rules {
            context: chain_context(new_ctx, &existing),
            source,
        },
        StrideError::Report {
            context: existing,
            source,
        } => StrideError::Report {
            context: chain_context(new_ctx, &existing),
            source,
        },
        StrideError::Io {
            path,
            message,
            source,
        } => StrideError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        StrideError::Config(msg) => StrideError::Config(chain_context(new_ctx, &msg)),
        StrideError::Validation(msg) => StrideError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| StrideError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| StrideError::Validation(f().into()))
    }
}
