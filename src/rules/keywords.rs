//! Keyword sets used by the component detector.

use crate::model::Feature;
use indexmap::IndexMap;

/// Keywords per feature, matched as case-folded substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCatalog {
    entries: IndexMap<Feature, Vec<String>>,
}

impl KeywordCatalog {
    /// The built-in keyword sets.
    #[must_use]
    pub fn builtin() -> Self {
        let table: [(Feature, &[&str]); 7] = [
            (Feature::Web, &["web application", "website", "public facing"]),
            (Feature::Api, &["api", "endpoint"]),
            (Feature::Database, &["database", "db"]),
            (Feature::Cloud, &["cloud", "aws", "azure"]),
            (Feature::Authentication, &["login", "password", "credential"]),
            (Feature::ThirdParty, &["third party", "external"]),
            (Feature::PublicFacing, &["public facing", "external facing"]),
        ];

        Self {
            entries: table
                .iter()
                .map(|(feature, words)| (*feature, words.iter().map(|w| (*w).to_string()).collect()))
                .collect(),
        }
    }

    /// Keywords for one feature.
    #[must_use]
    pub fn keywords(&self, feature: Feature) -> &[String] {
        self.entries.get(&feature).map_or(&[], Vec::as_slice)
    }

    /// Add keywords to a feature, skipping blanks and duplicates.
    pub fn extend<I, S>(&mut self, feature: Feature, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.entries.entry(feature).or_default();
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !entry.contains(&keyword) {
                entry.push(keyword);
            }
        }
    }

    /// Features and their keywords, in detection order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, &[String])> {
        self.entries.iter().map(|(f, words)| (*f, words.as_slice()))
    }

    /// Total number of keywords.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for KeywordCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
