//! Common types shared by the cache, the registry client and the pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last known registry state of a package, as stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    pub id: i64,
    pub name: String,
    pub latest_version: String,
    /// Most recent versions, newest first
    pub versions: Vec<String>,
    pub npm_page: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PackageRecord {
    /// Whether the record is younger than `window` at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        now.signed_duration_since(self.updated_at) < window
    }
}

/// Writable fields of a [`PackageRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPackage {
    pub name: String,
    pub latest_version: String,
    pub versions: Vec<String>,
    pub npm_page: Option<String>,
}

/// Abbreviated package metadata returned by a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub latest_version: String,
    /// All published versions, newest first
    pub versions: Vec<String>,
    /// Human-facing package page
    pub page: String,
}

impl PackageMetadata {
    /// Convert into a cache write, keeping only the `limit` most recent versions
    pub fn into_new_package(self, name: &str, limit: usize) -> NewPackage {
        let mut versions = self.versions;
        versions.truncate(limit);
        NewPackage {
            name: name.to_string(),
            latest_version: self.latest_version,
            versions,
            npm_page: Some(self.page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record_updated_at(updated_at: DateTime<Utc>) -> PackageRecord {
        PackageRecord {
            id: 1,
            name: "left-pad".to_string(),
            latest_version: "1.3.0".to_string(),
            versions: vec!["1.3.0".to_string()],
            npm_page: None,
            created_at: updated_at,
            updated_at,
        }
    }

    #[test]
    fn is_fresh_within_window() {
        let now = Utc::now();
        let record = record_updated_at(now - Duration::hours(23));
        assert!(record.is_fresh(now, Duration::hours(24)));
    }

    #[test]
    fn is_fresh_is_false_at_exact_window_boundary() {
        let now = Utc::now();
        let record = record_updated_at(now - Duration::hours(24));
        assert!(!record.is_fresh(now, Duration::hours(24)));
    }

    #[test]
    fn into_new_package_truncates_versions_keeping_newest() {
        let metadata = PackageMetadata {
            latest_version: "39.0.0".to_string(),
            versions: (0..40).rev().map(|i| format!("{}.0.0", i)).collect(),
            page: "https://www.npmjs.com/package/big".to_string(),
        };

        let package = metadata.into_new_package("big", 30);

        assert_eq!(package.versions.len(), 30);
        assert_eq!(package.versions.first().map(String::as_str), Some("39.0.0"));
        assert_eq!(package.versions.last().map(String::as_str), Some("10.0.0"));
        assert_eq!(
            package.npm_page.as_deref(),
            Some("https://www.npmjs.com/package/big")
        );
    }
}
