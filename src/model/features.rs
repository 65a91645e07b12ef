//! Component features detected in a system description.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A component signal the detector can raise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Web,
    Api,
    Database,
    Cloud,
    Authentication,
    #[serde(alias = "thirdParty", alias = "third-party")]
    ThirdParty,
    #[serde(alias = "publicFacing", alias = "public-facing")]
    PublicFacing,
}

impl Feature {
    /// All features in detection order.
    pub const ALL: [Self; 7] = [
        Self::Web,
        Self::Api,
        Self::Database,
        Self::Cloud,
        Self::Authentication,
        Self::ThirdParty,
        Self::PublicFacing,
    ];

    /// Configuration name of the feature.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Api => "api",
            Self::Database => "database",
            Self::Cloud => "cloud",
            Self::Authentication => "authentication",
            Self::ThirdParty => "third_party",
            Self::PublicFacing => "public_facing",
        }
    }

    /// Names accepted by [`FromStr`], used for suggestions.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::name).collect()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "web" => Ok(Self::Web),
            "api" => Ok(Self::Api),
            "database" | "db" => Ok(Self::Database),
            "cloud" => Ok(Self::Cloud),
            "authentication" | "auth" => Ok(Self::Authentication),
            "thirdparty" => Ok(Self::ThirdParty),
            "publicfacing" => Ok(Self::PublicFacing),
            _ => Err(format!("unknown feature '{s}'")),
        }
    }
}

/// Boolean feature vector produced by the component detector.
///
/// Features are independent; any subset may be set at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub web: bool,
    pub api: bool,
    pub database: bool,
    pub cloud: bool,
    pub authentication: bool,
    pub third_party: bool,
    pub public_facing: bool,
}

impl FeatureSet {
    /// Build a feature set from the listed features.
    #[must_use]
    pub fn from_features(features: &[Feature]) -> Self {
        let mut set = Self::default();
        for feature in features {
            set.set(*feature, true);
        }
        set
    }

    #[must_use]
    pub const fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::Web => self.web,
            Feature::Api => self.api,
            Feature::Database => self.database,
            Feature::Cloud => self.cloud,
            Feature::Authentication => self.authentication,
            Feature::ThirdParty => self.third_party,
            Feature::PublicFacing => self.public_facing,
        }
    }

    pub fn set(&mut self, feature: Feature, value: bool) {
        let slot = match feature {
            Feature::Web => &mut self.web,
            Feature::Api => &mut self.api,
            Feature::Database => &mut self.database,
            Feature::Cloud => &mut self.cloud,
            Feature::Authentication => &mut self.authentication,
            Feature::ThirdParty => &mut self.third_party,
            Feature::PublicFacing => &mut self.public_facing,
        };
        *slot = value;
    }

    /// Features that are set, in detection order.
    #[must_use]
    pub fn enabled(&self) -> Vec<Feature> {
        Feature::ALL.into_iter().filter(|f| self.get(*f)).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        Feature::ALL.iter().all(|f| !self.get(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_set_roundtrip_get_set() {
        let mut set = FeatureSet::default();
        assert!(set.is_empty());
        for feature in Feature::ALL {
            set.set(feature, true);
            assert!(set.get(feature));
        }
        assert_eq!(set.enabled().len(), Feature::ALL.len());
    }

    #[test]
    fn test_from_features() {
        let set = FeatureSet::from_features(&[Feature::Web, Feature::Database]);
        assert!(set.web && set.database);
        assert!(!set.api);
        assert_eq!(set.enabled(), vec![Feature::Web, Feature::Database]);
    }

    #[test]
    fn test_feature_parse_aliases() {
        assert_eq!("third-party".parse::<Feature>(), Ok(Feature::ThirdParty));
        assert_eq!("publicFacing".parse::<Feature>(), Ok(Feature::PublicFacing));
        assert_eq!("Public Facing".parse::<Feature>(), Ok(Feature::PublicFacing));
        assert!("mainframe".parse::<Feature>().is_err());
    }

    #[test]
    fn test_feature_set_json_is_camel_case() {
        let set = FeatureSet::from_features(&[Feature::ThirdParty]);
        let json = serde_json::to_value(set).unwrap();
        assert_eq!(json["thirdParty"], true);
        assert_eq!(json["publicFacing"], false);
    }
}
