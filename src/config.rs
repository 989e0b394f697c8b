use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Time-related constants
// =============================================================================

/// Default cache freshness window in milliseconds (24 hours)
pub const DEFAULT_FRESHNESS_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Timeout for a single registry fetch in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// Pipeline constants
// =============================================================================

/// Number of registry lookups allowed in flight at once
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Number of most recent versions kept per cached package
pub const MAX_CACHED_VERSIONS: usize = 30;

/// Default base URL for npm registry
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Default base URL for npm package pages
pub const DEFAULT_PAGE_URL: &str = "https://www.npmjs.com/package";

/// Tool configuration, read from `config.json` in the data directory
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditConfig {
    pub cache: CacheConfig,
    pub registry: RegistryConfig,
    pub pipeline: PipelineConfig,
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Records younger than this many milliseconds are served without a fetch
    pub freshness_window: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW_MS,
        }
    }
}

/// Registry endpoint configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    pub url: String,
    pub page_url: String,
    /// Deadline for one metadata fetch in milliseconds
    pub fetch_timeout: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            page_url: DEFAULT_PAGE_URL.to_string(),
            fetch_timeout: FETCH_TIMEOUT_MS,
        }
    }
}

/// Batch scheduling configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl AuditConfig {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults; an unreadable or malformed file is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Returns the path to the data directory for pkg-audit.
/// Uses $XDG_DATA_HOME/pkg-audit if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/pkg-audit,
/// or ./pkg-audit if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("packages.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("pkg-audit.log")
}

/// Returns the path to the configuration file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("pkg-audit")
}
