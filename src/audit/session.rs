//! Session files: the minimal key needed to rebuild a report from the cache

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::audit::error::AuditError;
use crate::audit::types::{AuditEntry, AuditReport};
use crate::version::store::PackageStore;

/// One dependency of a saved session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Cache id of the package; `None` when it was never resolved
    pub package_id: Option<i64>,
    /// Declared version range
    pub version: String,
    pub is_dev: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub name: String,
    pub records: Vec<SessionRecord>,
}

impl SessionReport {
    pub fn from_report(report: &AuditReport) -> Self {
        Self {
            name: report.project_name.clone(),
            records: report
                .records
                .iter()
                .map(|entry| SessionRecord {
                    package_id: entry.package.as_ref().map(|p| p.id),
                    version: entry.instance.version.clone(),
                    is_dev: entry.instance.is_dev,
                })
                .collect(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), AuditError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|source| AuditError::SessionFormat {
                path: path.to_path_buf(),
                source,
            })?;

        std::fs::write(path, content).map_err(|source| AuditError::SessionIo {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Saved session {} to {:?}", self.name, path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, AuditError> {
        let content = std::fs::read_to_string(path).map_err(|source| AuditError::SessionIo {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| AuditError::SessionFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Rebuild a report from the cached records, without touching the registry.
    ///
    /// Records without a package id, or whose package is no longer cached,
    /// are dropped. Entries come back with regular dependencies before dev
    /// dependencies, each group sorted by name.
    pub fn restore<S: PackageStore>(&self, store: &S) -> Result<AuditReport, AuditError> {
        let ids: Vec<i64> = self.records.iter().filter_map(|r| r.package_id).collect();
        let packages: HashMap<i64, _> = store
            .find_by_ids(&ids)?
            .into_iter()
            .map(|package| (package.id, package))
            .collect();

        let mut records = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let Some(package_id) = record.package_id else {
                warn!("Skipping unresolved {} record", record.version);
                continue;
            };
            // Duplicate ids share one cached record
            let Some(package) = packages.get(&package_id).cloned() else {
                warn!("Package id {} is no longer cached", package_id);
                continue;
            };
            records.push(AuditEntry::with_package(
                package.name.clone(),
                record.version.clone(),
                record.is_dev,
                package,
            ));
        }

        records.sort_by(|a, b| {
            a.instance
                .is_dev
                .cmp(&b.instance.is_dev)
                .then_with(|| a.package_name.cmp(&b.package_name))
        });

        Ok(AuditReport {
            project_name: self.name.clone(),
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::types::DependencyDeclaration;
    use crate::version::error::CacheError;
    use crate::version::semver::Outdated;
    use crate::version::store::MockPackageStore;
    use crate::version::types::PackageRecord;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(id: i64, name: &str, latest: &str) -> PackageRecord {
        let now = Utc::now();
        PackageRecord {
            id,
            name: name.to_string(),
            latest_version: latest.to_string(),
            versions: vec![latest.to_string()],
            npm_page: Some(format!("https://www.npmjs.com/package/{}", name)),
            created_at: now,
            updated_at: now,
        }
    }

    fn declaration(name: &str, version: &str, is_dev: bool) -> DependencyDeclaration {
        DependencyDeclaration {
            name: name.to_string(),
            version_range: version.to_string(),
            is_dev,
        }
    }

    fn session() -> SessionReport {
        SessionReport {
            name: "demo".to_string(),
            records: vec![
                SessionRecord {
                    package_id: Some(3),
                    version: "^7.0.0".to_string(),
                    is_dev: true,
                },
                SessionRecord {
                    package_id: Some(2),
                    version: "^17.0.0".to_string(),
                    is_dev: false,
                },
                SessionRecord {
                    package_id: None,
                    version: "1.0.0".to_string(),
                    is_dev: false,
                },
                SessionRecord {
                    package_id: Some(1),
                    version: "1.0.0".to_string(),
                    is_dev: false,
                },
            ],
        }
    }

    #[test]
    fn from_report_keeps_ids_and_declared_versions() {
        let report = AuditReport {
            project_name: "demo".to_string(),
            records: vec![
                AuditEntry::from_record(
                    &declaration("left-pad", "1.0.0", false),
                    record(7, "left-pad", "1.3.0"),
                ),
                AuditEntry::not_found(&declaration("ghost", "2.0.0", true)),
            ],
        };

        let session = SessionReport::from_report(&report);

        assert_eq!(session.name, "demo");
        assert_eq!(
            session.records,
            vec![
                SessionRecord {
                    package_id: Some(7),
                    version: "1.0.0".to_string(),
                    is_dev: false,
                },
                SessionRecord {
                    package_id: None,
                    version: "2.0.0".to_string(),
                    is_dev: true,
                },
            ]
        );
    }

    #[test]
    fn session_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(session()).unwrap();

        assert_eq!(json["name"], "demo");
        assert_eq!(
            json["records"][0],
            serde_json::json!({"packageId": 3, "version": "^7.0.0", "isDev": true})
        );
        assert_eq!(json["records"][2]["packageId"], serde_json::Value::Null);
    }

    #[test]
    fn save_then_load_reads_back_session() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        session().save(&path).unwrap();
        let loaded = SessionReport::load(&path).unwrap();

        assert_eq!(loaded, session());
    }

    #[test]
    fn load_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = SessionReport::load(&temp_dir.path().join("missing.json"));

        assert!(matches!(result, Err(AuditError::SessionIo { .. })));
    }

    #[test]
    fn load_reports_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, r#"{"name": "demo", "records": "nope"}"#).unwrap();

        let result = SessionReport::load(&path);

        assert!(matches!(result, Err(AuditError::SessionFormat { .. })));
    }

    #[test]
    fn restore_sorts_regular_before_dev_then_by_name() {
        let mut store = MockPackageStore::new();
        store
            .expect_find_by_ids()
            .withf(|ids| ids.to_vec() == vec![3, 2, 1])
            .times(1)
            .returning(|_| {
                Ok(vec![
                    record(1, "zod", "1.0.0"),
                    record(2, "react", "18.2.0"),
                    record(3, "eslint", "9.0.0"),
                ])
            });

        let report = session().restore(&store).unwrap();

        assert_eq!(report.project_name, "demo");
        let rows: Vec<_> = report
            .records
            .iter()
            .map(|e| (e.package_name.as_str(), e.instance.is_dev))
            .collect();
        assert_eq!(
            rows,
            vec![("react", false), ("zod", false), ("eslint", true)]
        );
        assert_eq!(report.records[0].instance.outdated, Outdated::Major);
        assert_eq!(report.records[0].instance.target_version, "18.2.0");
        assert_eq!(report.records[1].instance.outdated, Outdated::Ok);
    }

    #[test]
    fn restore_skips_packages_missing_from_cache() {
        let mut store = MockPackageStore::new();
        store
            .expect_find_by_ids()
            .returning(|_| Ok(vec![record(2, "react", "18.2.0")]));

        let report = session().restore(&store).unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].package_name, "react");
    }

    #[test]
    fn restore_propagates_store_errors() {
        let mut store = MockPackageStore::new();
        store
            .expect_find_by_ids()
            .returning(|_| Err(CacheError::LockPoisoned));

        let result = session().restore(&store);

        assert!(matches!(
            result,
            Err(AuditError::Cache(CacheError::LockPoisoned))
        ));
    }
}
