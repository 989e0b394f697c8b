//! Manifest layer
//! - types.rs: Manifest and DependencyDeclaration
//! - package_json.rs: package.json reader

pub mod package_json;
pub mod types;

pub use package_json::{ManifestError, PackageJsonParser};
pub use types::{DependencyDeclaration, Manifest};
