//! Tab-specific content rendering.

pub mod identities;
pub mod overview;
pub mod profile;
pub mod scans;
pub mod sources;
pub mod threats;
