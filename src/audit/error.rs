use std::path::PathBuf;

use thiserror::Error;

use crate::version::error::CacheError;

/// Errors raised by report-level operations (target selection, session files)
#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Failed to access session file {path:?}: {source}")]
    SessionIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid session file {path:?}: {source}")]
    SessionFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Package {0} is not in the report")]
    UnknownPackage(String),

    #[error("Package {0} was not found in the registry; no versions to choose from")]
    Unresolved(String),

    #[error("Version {version} is not a known version of {package}")]
    UnknownTargetVersion { package: String, version: String },
}
