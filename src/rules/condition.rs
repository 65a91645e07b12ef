//! Rule preconditions.
//!
//! System rules are gated by a [`Condition`] over detector features; flow and
//! boundary rules by a [`TextCondition`] over one case-folded text field.
//! Both have a `*Spec` form that is deserialized from rule files and compiled
//! into the evaluated form, so invalid feature names and regexes are caught
//! once, when the rule table is built.

use crate::error::{Result, RuleErrorKind, StrideError};
use crate::model::{Feature, FeatureSet};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Feature conditions
// ============================================================================

/// Boolean expression over detector features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Always,
    Feature(Feature),
    Any(Vec<Condition>),
    All(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// `a OR b OR ...` over plain features.
    #[must_use]
    pub fn any_of(features: &[Feature]) -> Self {
        Self::Any(features.iter().copied().map(Self::Feature).collect())
    }

    /// `a AND b AND ...` over plain features.
    #[must_use]
    pub fn all_of(features: &[Feature]) -> Self {
        Self::All(features.iter().copied().map(Self::Feature).collect())
    }

    #[must_use]
    pub fn negate(condition: Self) -> Self {
        Self::Not(Box::new(condition))
    }

    /// Evaluate against a feature vector.
    #[must_use]
    pub fn evaluate(&self, features: &FeatureSet) -> bool {
        match self {
            Self::Always => true,
            Self::Feature(feature) => features.get(*feature),
            Self::Any(parts) => parts.iter().any(|c| c.evaluate(features)),
            Self::All(parts) => parts.iter().all(|c| c.evaluate(features)),
            Self::Not(inner) => !inner.evaluate(features),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, parts: &[Condition], op: &str) -> fmt::Result {
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                match part {
                    Condition::Any(_) | Condition::All(_) => write!(f, "({part})")?,
                    _ => write!(f, "{part}")?,
                }
            }
            Ok(())
        }

        match self {
            Self::Always => f.write_str("always"),
            Self::Feature(feature) => write!(f, "{feature}"),
            Self::Any(parts) => join(f, parts, "OR"),
            Self::All(parts) => join(f, parts, "AND"),
            Self::Not(inner) => match inner.as_ref() {
                Self::Any(_) | Self::All(_) => write!(f, "NOT ({inner})"),
                _ => write!(f, "NOT {inner}"),
            },
        }
    }
}

/// Rule-file form of a [`Condition`].
///
/// ```yaml
/// when: always
/// when: cloud
/// when: { any: [authentication, api] }
/// when: { all: [public_facing, { not: web }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionSpec {
    Name(String),
    Any { any: Vec<ConditionSpec> },
    All { all: Vec<ConditionSpec> },
    Not { not: Box<ConditionSpec> },
}

impl ConditionSpec {
    /// Resolve feature names into an evaluable condition.
    pub fn compile(&self) -> Result<Condition> {
        match self {
            Self::Name(name) if name.trim().eq_ignore_ascii_case("always") => Ok(Condition::Always),
            Self::Name(name) => name
                .parse::<Feature>()
                .map(Condition::Feature)
                .map_err(|_| unknown_feature(name)),
            Self::Any { any } => any
                .iter()
                .map(Self::compile)
                .collect::<Result<Vec<_>>>()
                .map(Condition::Any),
            Self::All { all } => all
                .iter()
                .map(Self::compile)
                .collect::<Result<Vec<_>>>()
                .map(Condition::All),
            Self::Not { not } => not.compile().map(Condition::negate),
        }
    }
}

/// Build an unknown-feature error, suggesting the closest known name.
pub(crate) fn unknown_feature(name: &str) -> StrideError {
    let lowered = name.to_lowercase();
    let suggestion = Feature::names()
        .into_iter()
        .map(|candidate| (candidate, strsim::levenshtein(&lowered, candidate)))
        .filter(|(_, distance)| *distance <= 3)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate.to_string());

    StrideError::rules(
        "feature condition",
        RuleErrorKind::UnknownFeature {
            name: name.to_string(),
            suggestion,
        },
    )
}

// ============================================================================
// Text conditions
// ============================================================================

/// Case-folded text fields a condition can inspect.
pub trait TextFields<F> {
    fn field(&self, field: F) -> &str;
}

/// Keyword or regex test over one case-folded field.
#[derive(Debug, Clone)]
pub enum TextCondition<F> {
    Always,
    /// Any keyword occurs as a substring
    Contains { field: F, keywords: Vec<String> },
    /// The regex matches anywhere in the field, ignoring case
    Matches { field: F, regex: Regex },
}

impl<F: Copy> TextCondition<F> {
    /// Keyword condition; keywords are case-folded here.
    pub fn contains(field: F, keywords: &[&str]) -> Self {
        Self::Contains {
            field,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    #[must_use]
    pub fn evaluate(&self, fields: &impl TextFields<F>) -> bool {
        match self {
            Self::Always => true,
            Self::Contains { field, keywords } => {
                let text = fields.field(*field);
                keywords.iter().any(|k| text.contains(k.as_str()))
            }
            Self::Matches { field, regex } => regex.is_match(fields.field(*field)),
        }
    }
}

impl<F: fmt::Display> fmt::Display for TextCondition<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::Contains { field, keywords } => {
                let quoted: Vec<String> = keywords.iter().map(|k| format!("\"{k}\"")).collect();
                write!(f, "{field} contains {}", quoted.join(" | "))
            }
            Self::Matches { field, regex } => write!(f, "{field} matches /{}/", regex.as_str()),
        }
    }
}

/// Rule-file form of a [`TextCondition`].
///
/// ```yaml
/// when: always
/// when: { field: destination, contains: [queue, broker] }
/// when: { field: data_type, matches: "^card|pan$" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextConditionSpec<F> {
    Always(String),
    Contains { field: F, contains: Vec<String> },
    Matches { field: F, matches: String },
}

impl<F: Copy> TextConditionSpec<F> {
    pub fn compile(&self) -> Result<TextCondition<F>> {
        match self {
            Self::Always(word) if word.trim().eq_ignore_ascii_case("always") => {
                Ok(TextCondition::Always)
            }
            Self::Always(word) => Err(StrideError::rules(
                "text condition",
                RuleErrorKind::InvalidFile(format!(
                    "expected 'always' or a field condition, got '{word}'"
                )),
            )),
            Self::Contains { field, contains } => {
                if contains.iter().all(|k| k.trim().is_empty()) {
                    return Err(StrideError::rules(
                        "text condition",
                        RuleErrorKind::InvalidFile("'contains' needs at least one keyword".into()),
                    ));
                }
                Ok(TextCondition::Contains {
                    field: *field,
                    keywords: contains
                        .iter()
                        .filter(|k| !k.trim().is_empty())
                        .map(|k| k.to_lowercase())
                        .collect(),
                })
            }
            Self::Matches { field, matches } => RegexBuilder::new(matches)
                .case_insensitive(true)
                .build()
                .map(|regex| TextCondition::Matches {
                    field: *field,
                    regex,
                })
                .map_err(|e| {
                    StrideError::rules(
                        "text condition",
                        RuleErrorKind::InvalidRegex {
                            pattern: matches.clone(),
                            reason: e.to_string(),
                        },
                    )
                }),
        }
    }
}
