// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::Deserialize;

use crate::models::Threat;

#[derive(Debug, Clone, Deserialize)]
pub struct SystemStatus {
    pub status: Option<String>,
    pub last_scan: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreatCounts {
    #[serde(default)]
    pub critical: i64,
    #[serde(default)]
    pub high: i64,
    #[serde(default)]
    pub medium: i64,
    #[serde(default)]
    pub low: i64,
}

impl ThreatCounts {
    pub fn total(&self) -> i64 {
        self.critical + self.high + self.medium + self.low
    }
}

/// Response from `/dashboard/overview`.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardData {
    pub system_status: Option<SystemStatus>,
    #[serde(default)]
    pub monitored_identities: i64,
    #[serde(default)]
    pub threats: ThreatCounts,
    #[serde(default)]
    pub recent_security_findings: Vec<Threat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_parses_full_payload() {
        let data: DashboardData = serde_json::from_str(
            r#"{
                "system_status": {"status": "operational", "last_scan": "2026-08-20T11:00:00Z"},
                "monitored_identities": 4,
                "threats": {"critical": 1, "high": 2, "medium": 0, "low": 5},
                "recent_security_findings": [
                    {"id": 1, "finding_type": "email_exposure", "severity": "critical",
                     "url": "http://leak.example.onion", "created_at": "2026-08-20T10:00:00Z"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(data.monitored_identities, 4);
        assert_eq!(data.threats.total(), 8);
        assert_eq!(data.recent_security_findings.len(), 1);
    }

    #[test]
    fn test_overview_tolerates_missing_sections() {
        let data: DashboardData = serde_json::from_str("{}").unwrap();
        assert!(data.system_status.is_none());
        assert_eq!(data.threats.total(), 0);
    }
}
