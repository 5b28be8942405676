// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A monitored source site from `/sources`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub url: String,
    pub domain: Option<String>,
    pub category: Option<String>,
    pub risk_level: Option<String>,
    pub monitoring_priority: Option<i32>,
}

impl Source {
    pub fn display_domain(&self) -> &str {
        self.domain.as_deref().unwrap_or(&self.url)
    }
}

/// Aggregate counts from `/sources/stats`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceStats {
    #[serde(default)]
    pub total_sources: i64,
    #[serde(default)]
    pub by_category: BTreeMap<String, i64>,
    #[serde(default)]
    pub by_risk: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_defaults() {
        let stats: SourceStats = serde_json::from_str("{}").unwrap();
        assert_eq!(stats.total_sources, 0);
        assert!(stats.by_category.is_empty());
    }
}
