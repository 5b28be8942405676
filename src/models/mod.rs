//! Data models for the threat-monitoring API.
//!
//! This module contains all the data structures used to represent
//! backend entities including:
//!
//! - `User`: the logged-in account's profile
//! - `Scan`, `ScanStatus`, `ScanState`: scan runs and their lifecycle
//! - `Threat`, `ThreatReport`, `Severity`: findings and aggregates
//! - `Identity`: monitored identities
//! - `Source`, `SourceStats`: monitored source sites
//! - `DashboardData`: the overview snapshot

pub mod dashboard;
pub mod identity;
pub mod scan;
pub mod source;
pub mod threat;
pub mod user;

pub use dashboard::{DashboardData, SystemStatus, ThreatCounts};
pub use identity::{Identity, NewIdentity};
pub use scan::{Scan, ScanListResponse, ScanState, ScanStatus};
pub use source::{Source, SourceStats};
pub use threat::{Severity, Threat, ThreatPage, ThreatReport};
pub use user::{ProfileUpdate, User};
