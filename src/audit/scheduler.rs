//! Batch scheduling for the metadata pipeline
//!
//! Names are resolved in consecutive slices of `batch_size`. Every lookup in a
//! slice runs concurrently on the current task, and the next slice starts only
//! after the whole slice has finished, which caps in-flight registry requests
//! at `batch_size`.

use futures::future::join_all;
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::audit::pipeline::MetadataPipeline;
use crate::audit::types::{AuditEntry, AuditReport};
use crate::manifest::types::{DependencyDeclaration, Manifest};
use crate::version::error::CacheError;
use crate::version::store::PackageStore;

impl<S: PackageStore> MetadataPipeline<S> {
    /// Resolve one dependency section.
    ///
    /// Returns exactly one entry per name, in declaration order. A `batch_size`
    /// of zero is treated as one.
    pub async fn resolve_all(
        &self,
        dependencies: &IndexMap<String, String>,
        is_dev: bool,
        batch_size: usize,
    ) -> Result<Vec<AuditEntry>, CacheError> {
        let batch_size = batch_size.max(1);
        let declarations: Vec<_> = dependencies
            .iter()
            .map(|(name, version_range)| DependencyDeclaration {
                name: name.clone(),
                version_range: version_range.clone(),
                is_dev,
            })
            .collect();

        let mut entries = Vec::with_capacity(declarations.len());

        for (batch_num, batch) in declarations.chunks(batch_size).enumerate() {
            debug!(
                "Resolving batch {} ({} packages, dev: {})",
                batch_num + 1,
                batch.len(),
                is_dev
            );

            let results =
                join_all(batch.iter().map(|declaration| self.resolve(declaration))).await;
            for result in results {
                entries.push(result?);
            }
        }

        Ok(entries)
    }

    /// Audit a whole manifest: regular dependencies first, then dev dependencies
    pub async fn audit(
        &self,
        manifest: &Manifest,
        batch_size: usize,
    ) -> Result<AuditReport, CacheError> {
        info!(
            "Auditing {} ({} dependencies, {} dev dependencies)",
            manifest.project_name(),
            manifest.dependencies.len(),
            manifest.dev_dependencies.len()
        );

        let mut records = self
            .resolve_all(&manifest.dependencies, false, batch_size)
            .await?;
        records.extend(
            self.resolve_all(&manifest.dev_dependencies, true, batch_size)
                .await?,
        );

        Ok(AuditReport {
            project_name: manifest.project_name().to_string(),
            records,
        })
    }
}
