// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// Scan lifecycle state as reported by `/scan/status/{uuid}`.
///
/// `Completed` and `Failed` are terminal: once either is observed the
/// status poller stops re-fetching. Anything the server sends that we
/// don't recognize lands on `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Queued,
    Running,
    Completed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ScanState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Completed | ScanState::Failed)
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanState::Queued => write!(f, "queued"),
            ScanState::Running => write!(f, "running"),
            ScanState::Completed => write!(f, "completed"),
            ScanState::Failed => write!(f, "failed"),
            ScanState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Point-in-time status record for a single scan.
///
/// Replaced wholesale on every poll tick; fields are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanStatus {
    #[serde(default)]
    pub status: ScanState,
    pub scan_type: Option<String>,
    pub total_urls: Option<i64>,
    pub created_at: Option<String>,
}

/// One entry from `/scan/list/scans`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub scan_uuid: String,
    #[serde(default)]
    pub status: ScanState,
    pub scan_type: Option<String>,
    pub identity_id: Option<i64>,
    pub total_urls: Option<i64>,
    pub created_at: Option<String>,
}

impl Scan {
    pub fn display_type(&self) -> &str {
        self.scan_type.as_deref().unwrap_or("-")
    }
}

// The list endpoint returns either {"scans": [...]} or a bare array
// depending on server version.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScanListResponse {
    Wrapped { scans: Vec<Scan> },
    Bare(Vec<Scan>),
}

impl ScanListResponse {
    pub fn into_scans(self) -> Vec<Scan> {
        match self {
            ScanListResponse::Wrapped { scans } => scans,
            ScanListResponse::Bare(scans) => scans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_state_parses_lowercase() {
        let state: ScanState = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(state, ScanState::Running);
    }

    #[test]
    fn test_scan_state_unrecognized_is_unknown() {
        let state: ScanState = serde_json::from_str("\"paused\"").unwrap();
        assert_eq!(state, ScanState::Unknown);
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(ScanState::Completed.is_terminal());
        assert!(ScanState::Failed.is_terminal());
        assert!(!ScanState::Queued.is_terminal());
        assert!(!ScanState::Running.is_terminal());
        assert!(!ScanState::Unknown.is_terminal());
    }

    #[test]
    fn test_status_defaults_when_field_missing() {
        let status: ScanStatus = serde_json::from_str(r#"{"scan_type": "full"}"#).unwrap();
        assert_eq!(status.status, ScanState::Unknown);
        assert_eq!(status.scan_type.as_deref(), Some("full"));
    }

    #[test]
    fn test_list_response_wrapped_and_bare() {
        let wrapped: ScanListResponse =
            serde_json::from_str(r#"{"scans": [{"scan_uuid": "abc"}]}"#).unwrap();
        assert_eq!(wrapped.into_scans().len(), 1);

        let bare: ScanListResponse =
            serde_json::from_str(r#"[{"scan_uuid": "abc"}, {"scan_uuid": "def"}]"#).unwrap();
        assert_eq!(bare.into_scans().len(), 2);
    }
}
