//! Metadata refresh pipeline
//!
//! Resolves one declared dependency to an [`AuditEntry`]:
//! - Serve the cached record while it is younger than the freshness window
//! - Otherwise fetch from the registry under a deadline and upsert the cache
//! - Degrade to a "not found" entry when the fetch fails

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::audit::types::AuditEntry;
use crate::config::{
    AuditConfig, DEFAULT_FRESHNESS_WINDOW_MS, FETCH_TIMEOUT_MS, MAX_CACHED_VERSIONS,
};
use crate::manifest::types::DependencyDeclaration;
use crate::version::error::{CacheError, RegistryError};
use crate::version::registry::Registry;
use crate::version::store::PackageStore;
use crate::version::types::PackageMetadata;

/// Resolves declared dependencies against the package cache and the registry
pub struct MetadataPipeline<S: PackageStore> {
    store: Arc<S>,
    registry: Arc<dyn Registry>,
    freshness_window: chrono::Duration,
    fetch_timeout: Duration,
}

impl<S: PackageStore> MetadataPipeline<S> {
    pub fn new(store: Arc<S>, registry: Arc<dyn Registry>) -> Self {
        Self {
            store,
            registry,
            freshness_window: chrono::Duration::milliseconds(DEFAULT_FRESHNESS_WINDOW_MS),
            fetch_timeout: Duration::from_millis(FETCH_TIMEOUT_MS),
        }
    }

    pub fn from_config(store: Arc<S>, registry: Arc<dyn Registry>, config: &AuditConfig) -> Self {
        Self::new(store, registry)
            .with_freshness_window(chrono::Duration::milliseconds(
                config.cache.freshness_window,
            ))
            .with_fetch_timeout(Duration::from_millis(config.registry.fetch_timeout))
    }

    pub fn with_freshness_window(mut self, window: chrono::Duration) -> Self {
        self.freshness_window = window;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Resolve a single dependency.
    ///
    /// Registry failures never surface here; only cache-store errors do.
    pub async fn resolve(
        &self,
        declaration: &DependencyDeclaration,
    ) -> Result<AuditEntry, CacheError> {
        let name = declaration.name.as_str();

        if let Some(record) = self.store.find_by_name(name)?
            && record.is_fresh(chrono::Utc::now(), self.freshness_window)
        {
            debug!("Serving {} from cache (updated {})", name, record.updated_at);
            return Ok(AuditEntry::from_record(declaration, record));
        }

        let metadata = match self.fetch_with_deadline(name).await {
            Ok(metadata) => metadata,
            Err(e) => {
                error!("Failed to fetch metadata for {}: {}", name, e);
                return Ok(AuditEntry::not_found(declaration));
            }
        };

        let package = metadata.into_new_package(name, MAX_CACHED_VERSIONS);
        let record = self.store.upsert(&package).inspect_err(|e| {
            error!("Failed to save package {}: {}", name, e);
        })?;

        info!(
            "Saved {} (latest {}, {} versions)",
            name,
            record.latest_version,
            record.versions.len()
        );

        Ok(AuditEntry::from_record(declaration, record))
    }

    async fn fetch_with_deadline(&self, name: &str) -> Result<PackageMetadata, RegistryError> {
        debug!("Fetching {} from registry", name);
        tokio::time::timeout(self.fetch_timeout, self.registry.fetch_metadata(name))
            .await
            .map_err(|_| RegistryError::Timeout {
                package: name.to_string(),
                timeout_ms: self.fetch_timeout.as_millis() as u64,
            })?
    }
}
