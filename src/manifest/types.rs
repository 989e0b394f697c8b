//! Common types for manifests

use indexmap::IndexMap;

/// Project name used when the manifest does not carry one
pub const DEFAULT_PROJECT_NAME: &str = "Your report";

/// One dependency as declared in a manifest section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    /// Package name (e.g., "lodash", "@types/node")
    pub name: String,
    /// Version range as written (e.g., "^4.17.0")
    pub version_range: String,
    /// Declared under `devDependencies`
    pub is_dev: bool,
}

/// Parsed manifest: name to version-range mappings in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub name: Option<String>,
    pub dependencies: IndexMap<String, String>,
    pub dev_dependencies: IndexMap<String, String>,
}

impl Manifest {
    pub fn project_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_PROJECT_NAME)
    }

    /// Total number of declared dependencies across both sections
    pub fn len(&self) -> usize {
        self.dependencies.len() + self.dev_dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_defaults_when_missing() {
        assert_eq!(Manifest::default().project_name(), DEFAULT_PROJECT_NAME);
    }

    #[test]
    fn len_counts_both_sections() {
        let manifest = Manifest {
            name: Some("demo".to_string()),
            dependencies: IndexMap::from([
                ("zod".to_string(), "^3.0.0".to_string()),
                ("axios".to_string(), "1.0.0".to_string()),
            ]),
            dev_dependencies: IndexMap::from([("eslint".to_string(), "^7.0.0".to_string())]),
        };

        assert_eq!(manifest.project_name(), "demo");
        assert_eq!(manifest.len(), 3);
        assert!(!manifest.is_empty());
    }
}
