//! package.json reader

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;

use crate::manifest::types::Manifest;

/// Error type for manifest reading
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Not valid JSON, or a field has the wrong shape
    #[error("Invalid manifest JSON: {0}")]
    InvalidJson(String),

    /// Neither `dependencies` nor `devDependencies` is present
    #[error("Manifest declares neither dependencies nor devDependencies")]
    MissingDependencies,
}

/// Fields of package.json this tool reads; everything else is ignored
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPackageJson {
    name: Option<serde_json::Value>,
    dependencies: Option<IndexMap<String, serde_json::Value>>,
    dev_dependencies: Option<IndexMap<String, serde_json::Value>>,
}

/// Parser for package.json content
#[derive(Debug, Default)]
pub struct PackageJsonParser;

impl PackageJsonParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse the content and extract both dependency sections, keeping declaration order
    pub fn parse(&self, content: &str) -> Result<Manifest, ManifestError> {
        let raw: RawPackageJson = serde_json::from_str(content).map_err(|e| {
            warn!("Failed to parse package.json: {}", e);
            ManifestError::InvalidJson(e.to_string())
        })?;

        if raw.dependencies.is_none() && raw.dev_dependencies.is_none() {
            return Err(ManifestError::MissingDependencies);
        }

        let name = raw
            .name
            .as_ref()
            .and_then(|name| name.as_str())
            .map(str::to_string);

        Ok(Manifest {
            name,
            dependencies: Self::extract_section("dependencies", raw.dependencies),
            dev_dependencies: Self::extract_section("devDependencies", raw.dev_dependencies),
        })
    }

    /// Keep string-valued entries of a dependency section
    fn extract_section(
        field: &str,
        section: Option<IndexMap<String, serde_json::Value>>,
    ) -> IndexMap<String, String> {
        section
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::String(version) => Some((name, version)),
                other => {
                    warn!(
                        "Skipping {} entry {}: version is not a string ({})",
                        field, name, other
                    );
                    None
                }
            })
            .collect()
    }
}
