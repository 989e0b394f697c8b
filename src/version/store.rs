//! Storage contract for cached package records

#[cfg(test)]
use mockall::automock;

use crate::version::error::CacheError;
use crate::version::types::{NewPackage, PackageRecord};

/// Trait for storing and retrieving package records, keyed by package name
#[cfg_attr(test, automock)]
pub trait PackageStore: Send + Sync + 'static {
    /// Find the record for a package, if one was ever cached
    fn find_by_name(&self, name: &str) -> Result<Option<PackageRecord>, CacheError>;

    /// Find records by id; unknown ids are skipped
    fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<PackageRecord>, CacheError>;

    /// Insert a new record. Fails if the name is already cached.
    fn create(&self, package: &NewPackage) -> Result<PackageRecord, CacheError>;

    /// Overwrite the record stored under `name`
    fn update(&self, name: &str, package: &NewPackage) -> Result<PackageRecord, CacheError>;

    /// Insert the record, or update it in place if the name is already cached
    fn upsert(&self, package: &NewPackage) -> Result<PackageRecord, CacheError>;
}
