//! Registry test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use pkg_audit::version::cache::Cache;
use pkg_audit::version::error::RegistryError;
use pkg_audit::version::registry::Registry;
use pkg_audit::version::store::PackageStore;
use pkg_audit::version::types::{NewPackage, PackageMetadata};

/// Mock registry serving canned metadata and counting fetches
#[derive(Default)]
pub struct MockRegistry {
    packages: HashMap<String, PackageMetadata>,
    calls: AtomicUsize,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package; `versions` are newest first and the first one is latest
    pub fn with_package(mut self, package: &str, versions: Vec<&str>) -> Self {
        let versions: Vec<String> = versions.into_iter().map(|v| v.to_string()).collect();
        self.packages.insert(
            package.to_string(),
            PackageMetadata {
                latest_version: versions.first().cloned().unwrap_or_default(),
                versions,
                page: format!("https://www.npmjs.com/package/{}", package),
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn fetch_metadata(&self, package_name: &str) -> Result<PackageMetadata, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.packages.get(package_name) {
            Some(metadata) => Ok(metadata.clone()),
            None => Err(RegistryError::NotFound(package_name.to_string())),
        }
    }
}

/// Create a test cache with pre-populated records (versions newest first)
pub fn create_test_cache(packages: &[(&str, Vec<&str>)]) -> (TempDir, Arc<Cache>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let cache = Cache::new(&db_path).unwrap();

    for (package_name, versions) in packages {
        cache
            .upsert(&NewPackage {
                name: package_name.to_string(),
                latest_version: versions[0].to_string(),
                versions: versions.iter().map(|v| v.to_string()).collect(),
                npm_page: Some(format!("https://www.npmjs.com/package/{}", package_name)),
            })
            .unwrap();
    }

    (temp_dir, Arc::new(cache))
}
