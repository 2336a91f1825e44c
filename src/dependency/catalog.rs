//! Dependency catalog persistence and version selection
//!
//! The catalog is a TOML file of `[[dependencies]]` tables written by the
//! `retrieve` command and read by the `build` command. A version may appear
//! only once; re-inserting an identical descriptor is a no-op, while a
//! different checksum for a known version is a conflict.

use crate::dependency::descriptor::DependencyDescriptor;
use crate::error::{BuildpackError, BuildpackResult};
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Persisted set of verified descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Catalog {
    /// Version chosen when the build plan carries no constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<DependencyDescriptor>,
}

/// Outcome of inserting a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Added,
    Unchanged,
}

impl Catalog {
    /// Load a catalog, returning an empty one if the file does not exist
    pub fn load(path: &Path) -> BuildpackResult<Self> {
        if !path.exists() {
            debug!("Catalog {} not found, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| BuildpackError::io(format!("reading catalog {}", path.display()), e))?;
        Self::parse(&content).map_err(|e| BuildpackError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse a catalog from TOML text
    pub fn parse(content: &str) -> BuildpackResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write the catalog to disk, creating parent directories
    pub fn save(&self, path: &Path) -> BuildpackResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                BuildpackError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| BuildpackError::io(format!("writing catalog {}", path.display()), e))?;

        info!("Catalog saved to {}", path.display());
        Ok(())
    }

    /// Insert a verified descriptor.
    ///
    /// Fails with `CatalogConflict` when the version is already present
    /// under a different checksum.
    pub fn insert(&mut self, descriptor: DependencyDescriptor) -> BuildpackResult<InsertOutcome> {
        if let Some(existing) = self
            .dependencies
            .iter()
            .find(|d| d.id == descriptor.id && d.version == descriptor.version)
        {
            if existing.checksum != descriptor.checksum {
                return Err(BuildpackError::CatalogConflict {
                    version: descriptor.version,
                    existing: existing.checksum.clone(),
                    incoming: descriptor.checksum,
                });
            }
            debug!("Catalog already has {} {}", descriptor.id, descriptor.version);
            return Ok(InsertOutcome::Unchanged);
        }

        self.dependencies.push(descriptor);
        self.dependencies.sort_by(|a, b| {
            a.id.cmp(&b.id)
                .then_with(|| compare_versions(&a.version, &b.version))
        });
        Ok(InsertOutcome::Added)
    }

    /// Look up a descriptor by exact version
    pub fn find(&self, id: &str, version: &str) -> Option<&DependencyDescriptor> {
        self.dependencies
            .iter()
            .find(|d| d.id == id && d.version == version)
    }

    /// Select the descriptor satisfying `constraint` on `stack`.
    ///
    /// An empty or `default` constraint selects `default-version` when set,
    /// otherwise the highest version. A plain version matches exactly; any
    /// other constraint is a semver requirement.
    pub fn select(
        &self,
        id: &str,
        constraint: &str,
        stack: &str,
    ) -> BuildpackResult<&DependencyDescriptor> {
        let constraint = constraint.trim();
        let effective = match (constraint, &self.default_version) {
            ("" | "default", Some(default)) => default.as_str(),
            ("default", None) => "",
            _ => constraint,
        };

        let matcher = VersionMatcher::parse(effective)?;

        let candidates: Vec<&DependencyDescriptor> = self
            .dependencies
            .iter()
            .filter(|d| d.id == id && d.supports_stack(stack))
            .collect();

        candidates
            .iter()
            .copied()
            .filter(|d| matcher.matches(&d.version))
            .max_by(|a, b| compare_versions(&a.version, &b.version))
            .ok_or_else(|| BuildpackError::NoMatchingVersion {
                id: id.to_string(),
                constraint: constraint.to_string(),
                stack: stack.to_string(),
                available: available_versions(&candidates),
            })
    }
}

/// How a build-plan constraint is matched against catalog versions
#[derive(Debug)]
enum VersionMatcher {
    Any,
    Exact(Version),
    Requirement(VersionReq),
}

impl VersionMatcher {
    fn parse(constraint: &str) -> BuildpackResult<Self> {
        if constraint.is_empty() || constraint == "*" {
            return Ok(Self::Any);
        }
        if let Ok(version) = Version::parse(constraint) {
            return Ok(Self::Exact(version));
        }

        // A bare partial version pins the parts it names: `2.3` is `2.3.x`
        let requirement = if is_partial_version(constraint) {
            format!("={}", constraint)
        } else {
            constraint.to_string()
        };
        VersionReq::parse(&requirement)
            .map(Self::Requirement)
            .map_err(|e| BuildpackError::InvalidConstraint {
                constraint: constraint.to_string(),
                reason: e.to_string(),
            })
    }

    fn matches(&self, version: &str) -> bool {
        let Ok(parsed) = Version::parse(version) else {
            debug!("Skipping unparsable catalog version {}", version);
            return false;
        };
        match self {
            Self::Any => true,
            Self::Exact(expected) => parsed == *expected,
            Self::Requirement(req) => req.matches(&parsed),
        }
    }
}

fn is_partial_version(constraint: &str) -> bool {
    constraint.starts_with(|c: char| c.is_ascii_digit())
        && constraint.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Semver ordering with unparsable versions sorted first
fn compare_versions(a: &str, b: &str) -> std::cmp::Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => std::cmp::Ordering::Greater,
        (Err(_), Ok(_)) => std::cmp::Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn available_versions(candidates: &[&DependencyDescriptor]) -> String {
    if candidates.is_empty() {
        return "none".to_string();
    }
    candidates
        .iter()
        .map(|d| d.version.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::descriptor::assemble;
    use tempfile::TempDir;

    fn descriptor(version: &str, sha: &str) -> DependencyDescriptor {
        assemble(
            version,
            &format!("https://getcomposer.org/download/{}/composer.phar", version),
            sha,
            vec!["MIT".to_string()],
        )
    }

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        for (version, sha) in [("2.3.10", "aa"), ("2.4.4", "bb"), ("2.4.1", "cc"), ("1.10.26", "dd")] {
            catalog.insert(descriptor(version, sha)).unwrap();
        }
        catalog
    }

    #[test]
    fn insert_is_idempotent_for_identical_checksum() {
        let mut catalog = Catalog::default();
        assert_eq!(catalog.insert(descriptor("2.4.4", "bb")).unwrap(), InsertOutcome::Added);
        assert_eq!(
            catalog.insert(descriptor("2.4.4", "bb")).unwrap(),
            InsertOutcome::Unchanged
        );
        assert_eq!(catalog.dependencies.len(), 1);
    }

    #[test]
    fn insert_rejects_conflicting_checksum() {
        let mut catalog = Catalog::default();
        catalog.insert(descriptor("2.4.4", "bb")).unwrap();

        let err = catalog.insert(descriptor("2.4.4", "ff")).unwrap_err();
        match err {
            BuildpackError::CatalogConflict {
                version,
                existing,
                incoming,
            } => {
                assert_eq!(version, "2.4.4");
                assert_eq!(existing, "sha256:bb");
                assert_eq!(incoming, "sha256:ff");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(catalog.find("composer", "2.4.4").unwrap().checksum, "sha256:bb");
    }

    #[test]
    fn insert_keeps_versions_sorted() {
        let versions: Vec<_> = catalog()
            .dependencies
            .iter()
            .map(|d| d.version.clone())
            .collect();
        assert_eq!(versions, vec!["1.10.26", "2.3.10", "2.4.1", "2.4.4"]);
    }

    #[test]
    fn select_empty_constraint_picks_highest() {
        let catalog = catalog();
        assert_eq!(catalog.select("composer", "", "any-stack").unwrap().version, "2.4.4");
    }

    #[test]
    fn select_empty_constraint_prefers_default_version() {
        let mut catalog = catalog();
        catalog.default_version = Some("2.3.10".to_string());
        assert_eq!(catalog.select("composer", "", "s").unwrap().version, "2.3.10");
        assert_eq!(catalog.select("composer", "default", "s").unwrap().version, "2.3.10");
    }

    #[test]
    fn select_exact_and_requirements() {
        let catalog = catalog();
        assert_eq!(catalog.select("composer", "2.4.1", "s").unwrap().version, "2.4.1");
        assert_eq!(catalog.select("composer", "2.3.*", "s").unwrap().version, "2.3.10");
        assert_eq!(catalog.select("composer", "~2.4", "s").unwrap().version, "2.4.4");
        assert_eq!(catalog.select("composer", "^1", "s").unwrap().version, "1.10.26");
    }

    #[test]
    fn select_partial_version_stays_within_named_parts() {
        let catalog = catalog();
        assert_eq!(catalog.select("composer", "2.3", "s").unwrap().version, "2.3.10");
        assert_eq!(catalog.select("composer", "2.4", "s").unwrap().version, "2.4.4");
        assert_eq!(catalog.select("composer", "1", "s").unwrap().version, "1.10.26");
        assert!(matches!(
            catalog.select("composer", "2.5", "s"),
            Err(BuildpackError::NoMatchingVersion { .. })
        ));
    }

    #[test]
    fn select_reports_available_versions() {
        let catalog = catalog();
        let err = catalog.select("composer", "3.*", "s").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("3.*"));
        assert!(message.contains("2.4.4"));
    }

    #[test]
    fn select_filters_by_stack() {
        let mut catalog = Catalog::default();
        let mut bionic = descriptor("2.4.4", "bb");
        bionic.stacks = vec!["io.buildpacks.stacks.bionic".to_string()];
        catalog.insert(bionic).unwrap();

        assert!(catalog.select("composer", "", "io.buildpacks.stacks.bionic").is_ok());
        assert!(matches!(
            catalog.select("composer", "", "io.buildpacks.stacks.jammy"),
            Err(BuildpackError::NoMatchingVersion { .. })
        ));
    }

    #[test]
    fn select_rejects_invalid_constraint() {
        let catalog = catalog();
        assert!(matches!(
            catalog.select("composer", "not a version", "s"),
            Err(BuildpackError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("catalog.toml");

        let mut catalog = catalog();
        catalog.default_version = Some("2.4.4".to_string());
        catalog.save(&path).unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn load_missing_is_empty() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::load(&temp.path().join("missing.toml")).unwrap();
        assert!(catalog.dependencies.is_empty());
    }
}
