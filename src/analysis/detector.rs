//! Component detection over the free-text description.

use crate::model::{Feature, FeatureSet};
use crate::rules::KeywordCatalog;
use serde::Serialize;

/// Keyword-presence detector.
///
/// The description is case-folded once; a feature is raised when any of its
/// keywords occurs as a substring. Features are independent of each other.
#[derive(Debug, Clone, Copy)]
pub struct Detector<'a> {
    keywords: &'a KeywordCatalog,
}

impl<'a> Detector<'a> {
    #[must_use]
    pub const fn new(keywords: &'a KeywordCatalog) -> Self {
        Self { keywords }
    }

    /// Feature vector for a description.
    #[must_use]
    pub fn detect(&self, description: &str) -> FeatureSet {
        let folded = description.to_lowercase();
        let mut features = FeatureSet::default();
        for (feature, words) in self.keywords.iter() {
            if words.iter().any(|w| folded.contains(w.as_str())) {
                features.set(feature, true);
            }
        }
        features
    }

    /// Per-feature evidence: the first keyword that matched, if any.
    #[must_use]
    pub fn explain(&self, description: &str) -> Vec<FeatureEvidence> {
        let folded = description.to_lowercase();
        self.keywords
            .iter()
            .map(|(feature, words)| FeatureEvidence {
                feature,
                keyword: words.iter().find(|w| folded.contains(w.as_str())).cloned(),
            })
            .collect()
    }
}

/// Why a feature was (or was not) detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureEvidence {
    pub feature: Feature,
    pub keyword: Option<String>,
}

impl FeatureEvidence {
    #[must_use]
    pub const fn detected(&self) -> bool {
        self.keyword.is_some()
    }
}

/// Detect features with the built-in keyword sets.
#[must_use]
pub fn detect(description: &str) -> FeatureSet {
    Detector::new(&KeywordCatalog::builtin()).detect(description)
}
