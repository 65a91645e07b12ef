//! Built-in rule catalogue.
//!
//! Rule order inside each stage is part of the output contract: threat
//! identifiers follow it.

use super::condition::{Condition, TextCondition};
use super::stage::{
    BoundaryField, BoundaryRule, ComponentMapping, ComponentRule, FlowField, FlowRule, SystemRule,
};
use super::template::ThreatTemplate;
use crate::model::{Feature, StrideCategory};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use StrideCategory::{
    DenialOfService, ElevationOfPrivilege, InformationDisclosure, Repudiation, Spoofing, Tampering,
};

/// Precondition used for the system-level Denial of Service rule.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DosRuleVariant {
    /// `api OR web`
    #[default]
    ApiOrWeb,
    /// `api OR (web AND NOT public_facing)`
    ExcludePublicWeb,
}

impl DosRuleVariant {
    #[must_use]
    pub fn condition(self) -> Condition {
        match self {
            Self::ApiOrWeb => Condition::any_of(&[Feature::Api, Feature::Web]),
            Self::ExcludePublicWeb => Condition::Any(vec![
                Condition::Feature(Feature::Api),
                Condition::All(vec![
                    Condition::Feature(Feature::Web),
                    Condition::negate(Condition::Feature(Feature::PublicFacing)),
                ]),
            ]),
        }
    }
}

impl fmt::Display for DosRuleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiOrWeb => write!(f, "api-or-web"),
            Self::ExcludePublicWeb => write!(f, "exclude-public-web"),
        }
    }
}

/// Switches that select between built-in rule variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Append the `PUB-*` system rules
    pub public_facing_overlay: bool,
    /// Also treat "frontend" boundaries as spoofing-prone
    pub boundary_frontend_spoofing: bool,
    pub dos_rule: DosRuleVariant,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            public_facing_overlay: true,
            boundary_frontend_spoofing: false,
            dos_rule: DosRuleVariant::ApiOrWeb,
        }
    }
}

// ============================================================================
// System rules
// ============================================================================

/// System-level rules in STRIDE order, followed by the public-facing overlay.
#[must_use]
pub fn system_rules(options: &CatalogOptions) -> Vec<SystemRule> {
    let mut rules = vec![
        SystemRule {
            when: Condition::any_of(&[Feature::Authentication, Feature::Api]),
            template: ThreatTemplate::new(
                "SYS-S-001",
                Spoofing,
                "Attackers may impersonate legitimate users or services to gain unauthorized access.",
                "Implement multi-factor authentication (MFA), use strong session management, and validate API tokens with short expiration times.",
                "V2.1.1 - Verify strong authentication controls; V2.7.1 - Verify session management.",
                "Threat Assessment Level 1 - Identify authentication risks; Governance Level 2 - Define authentication policies.",
            )
            .with_controls("Use MFA (e.g., TOTP) and HTTP-only, Secure session cookies."),
        },
        SystemRule {
            when: Condition::any_of(&[Feature::Database, Feature::Web]),
            template: ThreatTemplate::new(
                "SYS-T-001",
                Tampering,
                "Data integrity may be compromised due to insufficient input validation or lack of integrity checks.",
                "Implement strict input validation, use parameterized queries for databases, and apply cryptographic hashing (e.g., SHA-256) for data integrity.",
                "V5.1.3 - Verify input validation; V5.3.4 - Verify secure database queries.",
                "Secure Architecture Level 1 - Define security requirements; Design Level 2 - Implement integrity controls.",
            )
            .with_controls("Use HMAC-SHA256 for data integrity and allow-list input validation."),
        },
        SystemRule {
            when: Condition::any_of(&[Feature::Authentication, Feature::Web]),
            template: ThreatTemplate::new(
                "SYS-R-001",
                Repudiation,
                "Actions may not be traceable due to insufficient logging or audit trails.",
                "Implement comprehensive logging of all security-relevant events, ensure logs are tamper-proof, and enable centralized log monitoring.",
                "V7.1.1 - Verify logging controls; V7.2.1 - Verify log integrity.",
                "Security Operations Level 2 - Enable audit logging; Incident Management Level 2 - Monitor logs.",
            )
            .with_controls("Ship audit logs to append-only storage (e.g., AWS CloudTrail with log file validation)."),
        },
        SystemRule {
            when: Condition::any_of(&[Feature::Database, Feature::Cloud]),
            template: ThreatTemplate::new(
                "SYS-I-001",
                InformationDisclosure,
                "Sensitive data may be exposed due to improper access controls or unencrypted storage/transmission.",
                "Encrypt sensitive data at rest (e.g., AES-256) and in transit (e.g., TLS 1.3), enforce least privilege access controls, and use secure key management.",
                "V4.1.3 - Verify access controls; V9.1.1 - Verify secure communication.",
                "Secure Architecture Level 2 - Standardize security controls; Implementation Level 2 - Secure data handling.",
            )
            .with_controls("Enable TLS 1.3 and use AES-256 for database encryption."),
        },
        SystemRule {
            when: options.dos_rule.condition(),
            template: ThreatTemplate::new(
                "SYS-D-001",
                DenialOfService,
                "System availability may be impacted by resource exhaustion or flooding attacks.",
                "Implement rate limiting, use Web Application Firewalls (WAF), enable auto-scaling, and deploy DDoS protection (e.g., AWS Shield).",
                "V1.10.1 - Verify anti-DoS controls; V13.1.1 - Verify API security.",
                "Incident Management Level 2 - Implement proactive monitoring; Operations Level 2 - Ensure availability.",
            )
            .with_controls("Configure rate limiting (e.g., 100 requests/min per client) and serve static content through a CDN."),
        },
        SystemRule {
            when: Condition::any_of(&[Feature::ThirdParty, Feature::Cloud]),
            template: ThreatTemplate::new(
                "SYS-E-001",
                ElevationOfPrivilege,
                "Attackers may gain unauthorized privileges due to misconfigured roles or third-party vulnerabilities.",
                "Enforce least privilege, implement role-based access control (RBAC), regularly audit third-party components, and apply security patches promptly.",
                "V4.2.1 - Verify RBAC; V14.2.3 - Verify dependency management.",
                "Secure Architecture Level 2 - Implement RBAC; Implementation Level 2 - Manage dependencies.",
            )
            .with_controls("Use cloud IAM roles scoped to least privilege and pin third-party dependency versions."),
        },
    ];

    if options.public_facing_overlay {
        rules.extend(public_facing_rules());
    }
    rules
}

fn public_facing_rules() -> Vec<SystemRule> {
    vec![
        SystemRule {
            when: Condition::all_of(&[Feature::PublicFacing, Feature::Authentication]),
            template: ThreatTemplate::new(
                "PUB-S-001",
                Spoofing,
                "Internet-exposed login surfaces invite credential stuffing and automated account takeover.",
                "Apply bot detection, progressive rate limits on authentication endpoints, and breached-password checks.",
                "V2.2.1 - Verify anti-automation controls; V2.1.7 - Verify breached password checks.",
                "Threat Assessment Level 2 - Model abuse cases; Operations Level 2 - Monitor authentication events.",
            )
            .with_controls("Enforce account lockout with exponential backoff and a CAPTCHA after repeated failures."),
        },
        SystemRule {
            when: Condition::Feature(Feature::PublicFacing),
            template: ThreatTemplate::new(
                "PUB-I-001",
                InformationDisclosure,
                "Publicly reachable services may leak stack traces, version banners or directory listings to anonymous users.",
                "Return generic error pages, strip server banners, and disable directory listing on exposed hosts.",
                "V7.4.1 - Verify generic error messages; V14.3.2 - Verify debug modes are disabled.",
                "Implementation Level 1 - Harden deployments; Verification Level 2 - Test exposed surfaces.",
            ),
        },
        SystemRule {
            when: Condition::Feature(Feature::PublicFacing),
            template: ThreatTemplate::new(
                "PUB-D-001",
                DenialOfService,
                "Volumetric DDoS attacks against internet-facing entry points can exhaust bandwidth and upstream capacity.",
                "Front the service with a CDN and managed DDoS protection, and keep origin addresses private.",
                "V1.10.1 - Verify anti-DoS controls; V13.1.1 - Verify API resilience.",
                "Operations Level 2 - Ensure availability; Incident Management Level 2 - Monitor for DoS.",
            )
            .with_controls("Enable AWS Shield or Cloudflare DDoS protection and restrict origin ingress to CDN ranges."),
        },
    ]
}

// ============================================================================
// Flow rules
// ============================================================================

#[must_use]
pub fn flow_rules() -> Vec<FlowRule> {
    vec![
        FlowRule {
            when: TextCondition::contains(FlowField::Source, &["user", "client"]),
            template: ThreatTemplate::new(
                "FLOW-S-001",
                Spoofing,
                "Unauthorized access in data flow from {source} to {destination}.",
                "Validate source identity with strong authentication (e.g., OAuth 2.0, JWT) and ensure secure session handling.",
                "V2.1.2 - Verify identity validation; V2.7.3 - Verify session binding.",
                "Threat Assessment Level 1 - Identify authentication risks; Governance Level 2 - Enforce identity policies.",
            )
            .with_controls("Use OAuth 2.0 with PKCE and RS256 JWT signing."),
        },
        FlowRule {
            when: TextCondition::Always,
            template: ThreatTemplate::new(
                "FLOW-T-001",
                Tampering,
                "Data integrity risk in flow from {source} to {destination}.",
                "Use digital signatures or HMAC for data integrity, and validate all inputs at the destination.",
                "V5.1.4 - Verify data integrity; V5.2.2 - Verify input sanitization.",
                "Design Level 2 - Implement integrity controls; Verification Level 1 - Validate inputs.",
            )
            .with_controls("Apply HMAC-SHA256 and schema-based validation."),
        },
        FlowRule {
            when: TextCondition::contains(FlowField::DataType, &["pii", "sensitive", "confidential"]),
            template: ThreatTemplate::new(
                "FLOW-I-001",
                InformationDisclosure,
                "Sensitive data ({data_type}) exposed in flow from {source} to {destination}.",
                "Encrypt data in transit with TLS 1.3, mask sensitive data in logs, and restrict access to authorized entities only.",
                "V9.1.2 - Verify encryption in transit; V4.1.4 - Verify access restrictions.",
                "Implementation Level 2 - Secure data handling; Operations Level 2 - Protect sensitive data.",
            )
            .with_controls("Use TLS 1.3 and data masking for logs."),
        },
        FlowRule {
            when: TextCondition::contains(FlowField::Destination, &["api", "server"]),
            template: ThreatTemplate::new(
                "FLOW-D-001",
                DenialOfService,
                "Potential DoS attack targeting {destination} in data flow.",
                "Implement rate limiting, use circuit breakers, and monitor traffic patterns for anomalies.",
                "V1.10.2 - Verify rate limiting; V13.1.2 - Verify API resilience.",
                "Incident Management Level 2 - Monitor for DoS; Operations Level 2 - Ensure availability.",
            ),
        },
    ]
}

// ============================================================================
// Boundary rules
// ============================================================================

#[must_use]
pub fn boundary_rules(options: &CatalogOptions) -> Vec<BoundaryRule> {
    let spoofing_keywords: &[&str] = if options.boundary_frontend_spoofing {
        &["boundary", "dmz", "frontend"]
    } else {
        &["boundary", "dmz"]
    };

    vec![
        BoundaryRule {
            when: TextCondition::contains(BoundaryField::Name, spoofing_keywords),
            template: ThreatTemplate::new(
                "BND-S-001",
                Spoofing,
                "Cross-boundary spoofing possible in {name}.",
                "Enforce strict boundary authentication (e.g., mutual TLS, API gateway authentication) and validate all cross-boundary requests.",
                "V2.1.3 - Verify boundary authentication; V13.2.1 - Verify API security.",
                "Threat Assessment Level 2 - Model boundary risks; Governance Level 2 - Define boundary policies.",
            )
            .with_controls("Use mutual TLS with client certificates."),
        },
        BoundaryRule {
            when: TextCondition::contains(BoundaryField::Name, &["database", "server", "backend"]),
            template: ThreatTemplate::new(
                "BND-T-001",
                Tampering,
                "Data tampering within {name} due to weak internal controls.",
                "Implement integrity checks (e.g., checksums), use secure coding practices, and validate data within the boundary.",
                "V5.1.3 - Verify input validation; V5.3.5 - Verify secure coding.",
                "Design Level 2 - Implement integrity controls; Verification Level 2 - Validate boundary controls.",
            )
            .with_controls("Apply SHA-256 checksums and OWASP secure coding guidelines."),
        },
        BoundaryRule {
            when: TextCondition::Always,
            template: ThreatTemplate::new(
                "BND-E-001",
                ElevationOfPrivilege,
                "Privilege escalation within {name} due to misconfigured access controls.",
                "Implement RBAC, segregate duties within the boundary, and regularly audit permissions.",
                "V4.2.2 - Verify segregation of duties; V4.2.1 - Verify RBAC.",
                "Secure Architecture Level 2 - Implement RBAC; Governance Level 2 - Audit permissions.",
            ),
        },
    ]
}

// ============================================================================
// Diagram components
// ============================================================================

/// Components inferred from features when a diagram is present, in order.
#[must_use]
pub fn component_mappings() -> Vec<ComponentMapping> {
    vec![
        ComponentMapping::new(Feature::Web, "Web Application"),
        ComponentMapping::new(Feature::Database, "Database"),
        ComponentMapping::new(Feature::Api, "API"),
        ComponentMapping::new(Feature::Cloud, "Cloud Service"),
    ]
}

#[must_use]
pub fn component_rules() -> Vec<ComponentRule> {
    vec![
        ComponentRule {
            template: ThreatTemplate::new(
                "DIAG-S-001",
                Spoofing,
                "Impersonation of {component} in diagram.",
                "Secure {component} with strong authentication (e.g., OAuth, certificates) and validate all interactions.",
                "V2.1.1 - Verify authentication controls; V13.2.2 - Verify API authentication.",
                "Threat Assessment Level 1 - Identify component risks; Governance Level 2 - Enforce authentication.",
            ),
        },
        ComponentRule {
            template: ThreatTemplate::new(
                "DIAG-I-001",
                InformationDisclosure,
                "Data exposure in {component} due to unencrypted channels or misconfiguration.",
                "Encrypt all data flows to/from {component} and restrict access to authorized entities.",
                "V9.1.1 - Verify secure communication; V4.1.3 - Verify access controls.",
                "Implementation Level 2 - Secure data flows; Operations Level 2 - Protect components.",
            ),
        },
        ComponentRule {
            template: ThreatTemplate::new(
                "DIAG-D-001",
                DenialOfService,
                "Resource exhaustion targeting {component} in diagram.",
                "Implement rate limiting and auto-scaling for {component}, and use WAF for protection.",
                "V1.10.1 - Verify anti-DoS controls; V13.1.1 - Verify API resilience.",
                "Incident Management Level 2 - Monitor components; Operations Level 2 - Ensure availability.",
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureSet;
    use std::collections::HashSet;

    #[test]
    fn test_system_rules_in_stride_order() {
        let rules = system_rules(&CatalogOptions {
            public_facing_overlay: false,
            ..CatalogOptions::default()
        });
        let categories: Vec<_> = rules.iter().map(|r| r.template.category).collect();
        assert_eq!(categories, StrideCategory::ALL.to_vec());
    }

    #[test]
    fn test_overlay_toggle() {
        let with = system_rules(&CatalogOptions::default());
        let without = system_rules(&CatalogOptions {
            public_facing_overlay: false,
            ..CatalogOptions::default()
        });
        assert_eq!(with.len(), without.len() + 3);
        assert!(with.iter().any(|r| r.template.id == "PUB-D-001"));
    }

    #[test]
    fn test_dos_variants_differ_on_public_web() {
        let public_web = FeatureSet::from_features(&[Feature::Web, Feature::PublicFacing]);
        assert!(DosRuleVariant::ApiOrWeb.condition().evaluate(&public_web));
        assert!(!DosRuleVariant::ExcludePublicWeb.condition().evaluate(&public_web));

        let api = FeatureSet::from_features(&[Feature::Api, Feature::PublicFacing]);
        assert!(DosRuleVariant::ExcludePublicWeb.condition().evaluate(&api));
    }

    #[test]
    fn test_rule_ids_unique_and_templates_complete() {
        let options = CatalogOptions {
            boundary_frontend_spoofing: true,
            ..CatalogOptions::default()
        };
        let templates: Vec<ThreatTemplate> = system_rules(&options)
            .into_iter()
            .map(|r| r.template)
            .chain(flow_rules().into_iter().map(|r| r.template))
            .chain(boundary_rules(&options).into_iter().map(|r| r.template))
            .chain(component_rules().into_iter().map(|r| r.template))
            .collect();

        let mut seen = HashSet::new();
        for template in &templates {
            template.validate().unwrap();
            assert!(seen.insert(template.id.clone()), "duplicate id {}", template.id);
        }
        assert_eq!(seen.len(), 19);
    }

    #[test]
    fn test_frontend_spoofing_variant() {
        let strict = boundary_rules(&CatalogOptions::default());
        let extended = boundary_rules(&CatalogOptions {
            boundary_frontend_spoofing: true,
            ..CatalogOptions::default()
        });
        assert_eq!(strict[0].when.to_string(), "name contains \"boundary\" | \"dmz\"");
        assert!(extended[0].when.to_string().contains("frontend"));
    }

    #[test]
    fn test_component_mapping_order() {
        let names: Vec<_> = component_mappings().into_iter().map(|m| m.component).collect();
        assert_eq!(names, ["Web Application", "Database", "API", "Cloud Service"]);
    }
}
