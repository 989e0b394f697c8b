//! npm registry API implementation

use std::collections::HashMap;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::types::PackageMetadata;

/// Abbreviated metadata; full documents can exceed 70MB for popular packages
const ABBREVIATED_METADATA: &str = "application/vnd.npm.install-v1+json";

const USER_AGENT: &str = concat!("pkg-audit/", env!("CARGO_PKG_VERSION"));

/// Response from npm registry API
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    /// Keys arrive in publish order, oldest first
    #[serde(default)]
    versions: IndexMap<String, IgnoredAny>,
}

/// Registry implementation for npm registry API
#[derive(Clone)]
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
    page_url: String,
}

impl NpmRegistry {
    /// Creates a new NpmRegistry against custom registry and package-page URLs
    pub fn new(base_url: &str, page_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_url: page_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        Self::new(
            &config.url,
            &config.page_url,
            Duration::from_millis(config.fetch_timeout),
        )
    }

    /// Encode package name for URL (handles scoped packages)
    fn encode_package_name(package_name: &str) -> String {
        if package_name.starts_with('@') {
            // Scoped package: @scope/name -> @scope%2Fname
            package_name.replace('/', "%2F")
        } else {
            package_name.to_string()
        }
    }

    fn package_page(&self, package_name: &str) -> String {
        format!("{}/{}", self.page_url, package_name)
    }
}

#[async_trait::async_trait]
impl Registry for NpmRegistry {
    async fn fetch_metadata(&self, package_name: &str) -> Result<PackageMetadata, RegistryError> {
        let encoded_name = Self::encode_package_name(package_name);
        let url = format!("{}/{}", self.base_url, encoded_name);
        debug!("Fetching npm metadata: {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, ABBREVIATED_METADATA)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if !status.is_success() {
            warn!("npm registry returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let mut package_info: NpmPackageResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse npm registry response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        let latest_version = package_info.dist_tags.remove("latest").ok_or_else(|| {
            RegistryError::InvalidResponse(format!(
                "Missing dist-tags.latest for {}",
                package_name
            ))
        })?;

        let versions: Vec<String> = package_info.versions.into_keys().rev().collect();

        Ok(PackageMetadata {
            latest_version,
            versions,
            page: self.package_page(package_name),
        })
    }
}
