//! Build-plan entry resolution
//!
//! Several buildpacks may require the same dependency, each naming where
//! its version constraint came from (`version-source`). The entry whose
//! source appears earliest in the priority list wins; unlisted sources
//! rank last and ties keep plan order. Layer flags are OR-merged across
//! every entry so no requested phase is dropped.

use crate::error::{BuildpackError, BuildpackResult};
use crate::layer::LayerFlags;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Entries contributed to this buildpack by the build plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(default)]
    pub entries: Vec<BuildPlanEntry>,
}

impl BuildPlan {
    /// Load a plan file
    pub fn load(path: &Path) -> BuildpackResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BuildpackError::io(format!("reading build plan {}", path.display()), e))?;
        toml::from_str(&content).map_err(|e| BuildpackError::PlanInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// A single build-plan requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlanEntry {
    pub name: String,

    #[serde(default)]
    pub metadata: EntryMetadata,
}

impl BuildPlanEntry {
    /// Entry requesting `version` from `source`
    pub fn versioned(name: &str, version: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            metadata: EntryMetadata {
                version: Some(version.to_string()),
                version_source: Some(source.to_string()),
                ..EntryMetadata::default()
            },
        }
    }
}

/// Metadata a requirer attaches to its entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntryMetadata {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub version_source: Option<String>,

    #[serde(default)]
    pub build: bool,

    #[serde(default)]
    pub launch: bool,
}

/// The effective version requirement after priority merging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequirement {
    /// Source that supplied the constraint, if any
    pub source_name: Option<String>,

    /// Constraint text; empty means "no constraint"
    pub version_constraint: String,
}

/// Ranks plan entries by version-source priority
#[derive(Debug, Clone)]
pub struct EntryResolver {
    priorities: Vec<String>,
}

impl EntryResolver {
    /// `priorities` lists version sources, highest priority first
    pub fn new(priorities: Vec<String>) -> Self {
        Self { priorities }
    }

    fn rank(&self, entry: &BuildPlanEntry) -> usize {
        entry
            .metadata
            .version_source
            .as_deref()
            .and_then(|source| self.priorities.iter().position(|p| p == source))
            .unwrap_or(self.priorities.len())
    }

    /// Entries named `name`, ordered by priority (stable)
    pub fn candidates(&self, name: &str, entries: &[BuildPlanEntry]) -> Vec<BuildPlanEntry> {
        let mut candidates: Vec<BuildPlanEntry> = entries
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect();
        candidates.sort_by_key(|e| self.rank(e));
        candidates
    }

    /// Pick the effective requirement and return the ranked candidates
    pub fn resolve(
        &self,
        name: &str,
        entries: &[BuildPlanEntry],
    ) -> BuildpackResult<(VersionRequirement, Vec<BuildPlanEntry>)> {
        let candidates = self.candidates(name, entries);
        let winner = candidates
            .first()
            .ok_or_else(|| BuildpackError::NoPlanEntry(name.to_string()))?;

        let requirement = VersionRequirement {
            source_name: winner.metadata.version_source.clone(),
            version_constraint: winner.metadata.version.clone().unwrap_or_default(),
        };

        log_candidates(&candidates);
        Ok((requirement, candidates))
    }

    /// OR-merge of the `build`/`launch` requests for `name`.
    ///
    /// `cache` follows the requested `build` flag. When nothing is requested
    /// the dependency is still needed to run the build, so `build` defaults
    /// to true while `cache` stays false.
    pub fn merge_layer_flags(&self, name: &str, entries: &[BuildPlanEntry]) -> LayerFlags {
        let (build, launch) = entries
            .iter()
            .filter(|e| e.name == name)
            .fold((false, false), |(build, launch), e| {
                (build || e.metadata.build, launch || e.metadata.launch)
            });

        LayerFlags {
            build: build || !launch,
            launch,
            cache: build,
        }
    }
}

fn log_candidates(candidates: &[BuildPlanEntry]) {
    info!("Candidate version sources (in priority order):");
    for entry in candidates {
        info!(
            "  {} -> \"{}\"",
            entry.metadata.version_source.as_deref().unwrap_or("<unknown>"),
            entry.metadata.version.as_deref().unwrap_or("")
        );
    }
}
