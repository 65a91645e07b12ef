//! Threat records emitted by the inference engine.

use super::StrideCategory;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Sequential threat identifier, displayed as `T<n>`.
///
/// Identifiers are unique and contiguous within one analysis pass and are
/// recomputed from scratch on every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreatId(u32);

impl ThreatId {
    /// Create an identifier from its 1-based sequence number.
    #[must_use]
    pub const fn new(sequence: u32) -> Self {
        Self(sequence)
    }

    /// The 1-based sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ThreatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

impl FromStr for ThreatId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('T')
            .or_else(|| s.strip_prefix('t'))
            .ok_or_else(|| format!("threat id '{s}' must start with 'T'"))?;
        match digits.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(format!("threat id '{s}' must be T followed by a positive number")),
        }
    }
}

impl Serialize for ThreatId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ThreatId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Analysis stage that emitted a threat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatOrigin {
    /// Gated by the description's feature vector
    #[default]
    System,
    /// Emitted for a declared data flow
    Flow,
    /// Emitted for a declared trust boundary
    Boundary,
    /// Emitted for a component inferred from an uploaded diagram
    Diagram,
}

impl ThreatOrigin {
    pub const ALL: [Self; 4] = [Self::System, Self::Flow, Self::Boundary, Self::Diagram];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Flow => "flow",
            Self::Boundary => "boundary",
            Self::Diagram => "diagram",
        }
    }
}

impl fmt::Display for ThreatOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A threat that has matched but has not been numbered yet.
///
/// Analyzers produce drafts; the aggregator turns them into [`Threat`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreatDraft {
    pub rule_id: String,
    pub origin: ThreatOrigin,
    pub category: StrideCategory,
    pub description: String,
    pub mitigation: String,
    pub controls: Option<String>,
    pub asvs: String,
    pub samm: String,
    pub dfd_element: String,
}

impl ThreatDraft {
    /// Attach an identifier.
    #[must_use]
    pub fn into_threat(self, id: ThreatId) -> Threat {
        Threat {
            id,
            category: self.category,
            description: self.description,
            mitigation: self.mitigation,
            controls: self.controls,
            asvs: self.asvs,
            samm: self.samm,
            dfd_element: self.dfd_element,
            rule_id: self.rule_id,
            origin: self.origin,
        }
    }
}

/// A numbered STRIDE threat.
///
/// Serialized with the fields `id, type, description, stride, mitigation,
/// controls?, asvs, samm, dfdElement`, followed by `ruleId` and `origin`.
/// `type` and `stride` both carry the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ThreatRecord", try_from = "ThreatRecord")]
pub struct Threat {
    pub id: ThreatId,
    pub category: StrideCategory,
    pub description: String,
    pub mitigation: String,
    /// Tool-specific implementation guidance, only for rules that define it
    pub controls: Option<String>,
    pub asvs: String,
    pub samm: String,
    /// Node name or `"<source> → <destination>"` edge label
    pub dfd_element: String,
    pub rule_id: String,
    pub origin: ThreatOrigin,
}

impl Threat {
    /// Short label used on diagrams: `T3: Tampering`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}: {}", self.id, self.category)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreatRecord {
    id: ThreatId,
    #[serde(rename = "type")]
    threat_type: StrideCategory,
    description: String,
    stride: StrideCategory,
    mitigation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    controls: Option<String>,
    asvs: String,
    samm: String,
    dfd_element: String,
    #[serde(default)]
    rule_id: String,
    #[serde(default)]
    origin: ThreatOrigin,
}

impl From<Threat> for ThreatRecord {
    fn from(threat: Threat) -> Self {
        Self {
            id: threat.id,
            threat_type: threat.category,
            description: threat.description,
            stride: threat.category,
            mitigation: threat.mitigation,
            controls: threat.controls,
            asvs: threat.asvs,
            samm: threat.samm,
            dfd_element: threat.dfd_element,
            rule_id: threat.rule_id,
            origin: threat.origin,
        }
    }
}

impl TryFrom<ThreatRecord> for Threat {
    type Error = String;

    fn try_from(record: ThreatRecord) -> Result<Self, Self::Error> {
        if record.threat_type != record.stride {
            return Err(format!(
                "threat {}: type '{}' does not match stride '{}'",
                record.id, record.threat_type, record.stride
            ));
        }
        Ok(Self {
            id: record.id,
            category: record.stride,
            description: record.description,
            mitigation: record.mitigation,
            controls: record.controls,
            asvs: record.asvs,
            samm: record.samm,
            dfd_element: record.dfd_element,
            rule_id: record.rule_id,
            origin: record.origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(controls: Option<&str>) -> Threat {
        ThreatDraft {
            rule_id: "FLOW-T-001".to_string(),
            origin: ThreatOrigin::Flow,
            category: StrideCategory::Tampering,
            description: "Data integrity risk in flow from user to api.".to_string(),
            mitigation: "Use digital signatures.".to_string(),
            controls: controls.map(str::to_string),
            asvs: "V5.1.4".to_string(),
            samm: "Design Level 2".to_string(),
            dfd_element: "User → API".to_string(),
        }
        .into_threat(ThreatId::new(2))
    }

    #[test]
    fn test_threat_id_display_and_parse() {
        assert_eq!(ThreatId::new(12).to_string(), "T12");
        assert_eq!("T7".parse::<ThreatId>(), Ok(ThreatId::new(7)));
        assert!("T0".parse::<ThreatId>().is_err());
        assert!("7".parse::<ThreatId>().is_err());
    }

    #[test]
    fn test_threat_json_field_names() {
        let json = serde_json::to_value(sample(Some("HMAC-SHA256"))).unwrap();
        assert_eq!(json["id"], "T2");
        assert_eq!(json["type"], "Tampering");
        assert_eq!(json["stride"], "Tampering");
        assert_eq!(json["dfdElement"], "User → API");
        assert_eq!(json["controls"], "HMAC-SHA256");
        assert_eq!(json["ruleId"], "FLOW-T-001");
        assert_eq!(json["origin"], "flow");
    }

    #[test]
    fn test_threat_json_omits_missing_controls() {
        let json = serde_json::to_value(sample(None)).unwrap();
        assert!(json.get("controls").is_none());
    }

    #[test]
    fn test_threat_rejects_mismatched_type_and_stride() {
        let raw = r#"{"id":"T1","type":"Spoofing","description":"d","stride":"Tampering",
            "mitigation":"m","asvs":"a","samm":"s","dfdElement":"x"}"#;
        let err = serde_json::from_str::<Threat>(raw).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_threat_json_roundtrip() {
        let threat = sample(None);
        let text = serde_json::to_string(&threat).unwrap();
        let back: Threat = serde_json::from_str(&text).unwrap();
        assert_eq!(back, threat);
    }

    #[test]
    fn test_label() {
        assert_eq!(sample(None).label(), "T2: Tampering");
    }
}
