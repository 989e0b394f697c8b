//! Audit report types

use serde::{Deserialize, Serialize};

use crate::audit::error::AuditError;
use crate::manifest::types::DependencyDeclaration;
use crate::version::semver::{Outdated, classify_delta};
use crate::version::types::PackageRecord;

/// Per-manifest facts about one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyInstance {
    pub is_dev: bool,
    /// Version range as declared in the manifest
    pub version: String,
    /// Version the upgrade command installs; defaults to the latest version
    pub target_version: String,
    pub outdated: Outdated,
}

/// One row of an audit report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub package_name: String,
    /// `None` when neither the cache nor the registry knew the package
    pub package: Option<PackageRecord>,
    pub instance: DependencyInstance,
}

impl AuditEntry {
    /// Build an entry from known registry state
    pub fn from_record(declaration: &DependencyDeclaration, record: PackageRecord) -> Self {
        Self::with_package(
            declaration.name.clone(),
            declaration.version_range.clone(),
            declaration.is_dev,
            record,
        )
    }

    pub(crate) fn with_package(
        package_name: String,
        version: String,
        is_dev: bool,
        record: PackageRecord,
    ) -> Self {
        let outdated = classify_delta(&version, &record.latest_version);
        Self {
            package_name,
            instance: DependencyInstance {
                is_dev,
                version,
                target_version: record.latest_version.clone(),
                outdated,
            },
            package: Some(record),
        }
    }

    /// Build the entry for a package nothing is known about
    pub fn not_found(declaration: &DependencyDeclaration) -> Self {
        Self {
            package_name: declaration.name.clone(),
            package: None,
            instance: DependencyInstance {
                is_dev: declaration.is_dev,
                version: declaration.version_range.clone(),
                target_version: declaration.version_range.clone(),
                outdated: Outdated::Ok,
            },
        }
    }

    pub fn latest_version(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.latest_version.as_str())
    }

    /// Whether the target is the registry's latest version
    pub fn targets_latest(&self) -> bool {
        self.latest_version() == Some(self.instance.target_version.as_str())
    }

    /// Pick another version to upgrade to; it must be one of the cached versions
    pub fn set_target_version(&mut self, version: &str) -> Result<(), AuditError> {
        let Some(package) = &self.package else {
            return Err(AuditError::Unresolved(self.package_name.clone()));
        };

        let known =
            package.latest_version == version || package.versions.iter().any(|v| v == version);
        if !known {
            return Err(AuditError::UnknownTargetVersion {
                package: self.package_name.clone(),
                version: version.to_string(),
            });
        }

        self.instance.target_version = version.to_string();
        Ok(())
    }
}

/// Result of auditing one manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub project_name: String,
    /// Regular dependencies first, then dev dependencies
    pub records: Vec<AuditEntry>,
}

impl AuditReport {
    /// Set the target version of every entry named `package_name`
    pub fn set_target_version(
        &mut self,
        package_name: &str,
        version: &str,
    ) -> Result<(), AuditError> {
        let mut matched = false;
        for entry in self
            .records
            .iter_mut()
            .filter(|entry| entry.package_name == package_name)
        {
            entry.set_target_version(version)?;
            matched = true;
        }

        if matched {
            Ok(())
        } else {
            Err(AuditError::UnknownPackage(package_name.to_string()))
        }
    }

    /// Entries with any newer major, minor or patch release
    pub fn outdated_entries(&self) -> Vec<&AuditEntry> {
        self.records
            .iter()
            .filter(|entry| entry.instance.outdated.is_outdated())
            .collect()
    }

    /// Entries with the given names, in report order
    pub fn entries_named(&self, names: &[String]) -> Result<Vec<&AuditEntry>, AuditError> {
        if let Some(missing) = names
            .iter()
            .find(|name| !self.records.iter().any(|entry| &entry.package_name == *name))
        {
            return Err(AuditError::UnknownPackage(missing.clone()));
        }

        Ok(self
            .records
            .iter()
            .filter(|entry| names.contains(&entry.package_name))
            .collect())
    }
}
