// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Sort key: critical first.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Unknown => 4,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
            Severity::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single finding. The same shape backs `/scan/threats/{uuid}`,
/// `/threats/report` recent findings, and the dashboard feed, so
/// everything past the core fields is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threat {
    pub id: i64,
    pub uuid: Option<String>,
    pub url: Option<String>,
    pub finding_type: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    pub description: Option<String>,
    pub matched_pattern: Option<String>,
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub false_positive: bool,
    pub created_at: Option<String>,
}

impl Threat {
    /// Finding type with underscores spaced out for display.
    pub fn display_type(&self) -> String {
        self.finding_type
            .as_deref()
            .unwrap_or("unknown")
            .replace('_', " ")
    }
}

/// Paged findings for one scan, from `/scan/threats/{uuid}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreatPage {
    pub scan_uuid: Option<String>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub threats: Vec<Threat>,
}

/// Aggregate report from `/threats/report`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreatReport {
    #[serde(default)]
    pub total_threats: i64,
    #[serde(default)]
    pub by_severity: BTreeMap<String, i64>,
    #[serde(default)]
    pub by_type: BTreeMap<String, i64>,
    #[serde(default)]
    pub recent_findings: Vec<Threat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical.rank() < Severity::High.rank());
        assert!(Severity::High.rank() < Severity::Medium.rank());
        assert!(Severity::Medium.rank() < Severity::Low.rank());
    }

    #[test]
    fn test_threat_minimal_shape() {
        // Dashboard feed entries carry only a few fields.
        let threat: Threat = serde_json::from_str(
            r#"{"id": 7, "finding_type": "credential_leak", "severity": "high",
                "url": "http://example.onion/dump", "created_at": "2026-08-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(threat.severity, Severity::High);
        assert_eq!(threat.display_type(), "credential leak");
        assert!(!threat.verified);
    }

    #[test]
    fn test_report_defaults() {
        let report: ThreatReport = serde_json::from_str("{}").unwrap();
        assert_eq!(report.total_threats, 0);
        assert!(report.recent_findings.is_empty());
    }
}
