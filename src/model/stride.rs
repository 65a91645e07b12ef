//! STRIDE threat categories.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six STRIDE categories.
///
/// Declaration order is STRIDE order, so the derived `Ord` sorts
/// Spoofing first and Elevation of Privilege last.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum StrideCategory {
    #[serde(alias = "spoofing", alias = "S")]
    Spoofing,
    #[serde(alias = "tampering", alias = "T")]
    Tampering,
    #[serde(alias = "repudiation", alias = "R")]
    Repudiation,
    #[serde(
        rename = "Information Disclosure",
        alias = "information-disclosure",
        alias = "information_disclosure",
        alias = "I"
    )]
    InformationDisclosure,
    #[serde(
        rename = "Denial of Service",
        alias = "denial-of-service",
        alias = "denial_of_service",
        alias = "D"
    )]
    DenialOfService,
    #[serde(
        rename = "Elevation of Privilege",
        alias = "elevation-of-privilege",
        alias = "elevation_of_privilege",
        alias = "E"
    )]
    ElevationOfPrivilege,
}

impl StrideCategory {
    /// All categories in STRIDE order.
    pub const ALL: [Self; 6] = [
        Self::Spoofing,
        Self::Tampering,
        Self::Repudiation,
        Self::InformationDisclosure,
        Self::DenialOfService,
        Self::ElevationOfPrivilege,
    ];

    /// Human-readable category name, as shown in reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Spoofing => "Spoofing",
            Self::Tampering => "Tampering",
            Self::Repudiation => "Repudiation",
            Self::InformationDisclosure => "Information Disclosure",
            Self::DenialOfService => "Denial of Service",
            Self::ElevationOfPrivilege => "Elevation of Privilege",
        }
    }

    /// Single-letter STRIDE code.
    #[must_use]
    pub const fn code(&self) -> char {
        match self {
            Self::Spoofing => 'S',
            Self::Tampering => 'T',
            Self::Repudiation => 'R',
            Self::InformationDisclosure => 'I',
            Self::DenialOfService => 'D',
            Self::ElevationOfPrivilege => 'E',
        }
    }

    /// The security property this category violates.
    #[must_use]
    pub const fn violated_property(&self) -> &'static str {
        match self {
            Self::Spoofing => "Authentication",
            Self::Tampering => "Integrity",
            Self::Repudiation => "Non-repudiation",
            Self::InformationDisclosure => "Confidentiality",
            Self::DenialOfService => "Availability",
            Self::ElevationOfPrivilege => "Authorization",
        }
    }
}

impl fmt::Display for StrideCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrideCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match normalized.as_str() {
            "s" | "spoofing" => Ok(Self::Spoofing),
            "t" | "tampering" => Ok(Self::Tampering),
            "r" | "repudiation" => Ok(Self::Repudiation),
            "i" | "informationdisclosure" => Ok(Self::InformationDisclosure),
            "d" | "denialofservice" | "dos" => Ok(Self::DenialOfService),
            "e" | "elevationofprivilege" | "eop" => Ok(Self::ElevationOfPrivilege),
            _ => Err(format!("unknown STRIDE category '{s}'")),
        }
    }
}
