//! Build-time dependency resolution and delivery
//!
//! The build step only needs two operations from its collaborator:
//! resolve a version requirement to a catalog descriptor, and deliver
//! that descriptor's artifact into a directory.

use crate::dependency::catalog::Catalog;
use crate::dependency::descriptor::DependencyDescriptor;
use crate::error::{BuildpackError, BuildpackResult};
use crate::plan::VersionRequirement;
use crate::retrieval::{sha256_hex, Transport};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resolves and delivers dependencies during a build
pub trait DependencyManager {
    /// Resolve `requirement` to a descriptor usable on `stack`
    fn resolve(
        &self,
        requirement: &VersionRequirement,
        stack: &str,
    ) -> BuildpackResult<DependencyDescriptor>;

    /// Place the descriptor's artifact into `destination`
    fn deliver(&self, descriptor: &DependencyDescriptor, destination: &Path) -> BuildpackResult<()>;
}

/// Dependency manager backed by a catalog file
pub struct CatalogDependencyManager<'a> {
    id: String,
    catalog: Catalog,
    transport: &'a dyn Transport,
    offline_dir: Option<PathBuf>,
}

impl<'a> CatalogDependencyManager<'a> {
    pub fn new(id: &str, catalog: Catalog, transport: &'a dyn Transport) -> Self {
        Self {
            id: id.to_string(),
            catalog,
            transport,
            offline_dir: None,
        }
    }

    /// Prefer pre-fetched artifacts at `<dir>/<hex checksum>/<file name>`
    pub fn with_offline_dir(mut self, dir: PathBuf) -> Self {
        self.offline_dir = Some(dir);
        self
    }

    fn offline_copy(&self, descriptor: &DependencyDescriptor) -> Option<PathBuf> {
        let dir = self.offline_dir.as_ref()?;
        let path = dir
            .join(descriptor.checksum_hex())
            .join(descriptor.artifact_name());
        path.is_file().then_some(path)
    }

    fn fetch(&self, descriptor: &DependencyDescriptor) -> BuildpackResult<Vec<u8>> {
        if let Some(path) = self.offline_copy(descriptor) {
            debug!("Using offline copy {}", path.display());
            return fs::read(&path)
                .map_err(|e| BuildpackError::io(format!("reading {}", path.display()), e));
        }
        self.transport.fetch(&descriptor.uri)
    }
}

impl DependencyManager for CatalogDependencyManager<'_> {
    fn resolve(
        &self,
        requirement: &VersionRequirement,
        stack: &str,
    ) -> BuildpackResult<DependencyDescriptor> {
        let descriptor = self
            .catalog
            .select(&self.id, &requirement.version_constraint, stack)?;
        info!(
            "Selected {} version {} (constraint \"{}\")",
            descriptor.name, descriptor.version, requirement.version_constraint
        );
        Ok(descriptor.clone())
    }

    fn deliver(&self, descriptor: &DependencyDescriptor, destination: &Path) -> BuildpackResult<()> {
        let bytes = self.fetch(descriptor)?;

        let actual = sha256_hex(&bytes);
        if actual != descriptor.checksum_hex() {
            return Err(BuildpackError::Integrity {
                expected: descriptor.checksum.clone(),
                actual: format!("sha256:{}", actual),
                source_uri: descriptor.uri.clone(),
            });
        }

        let target = destination.join(descriptor.artifact_name());
        fs::write(&target, &bytes)
            .map_err(|e| BuildpackError::delivery(&target, "writing artifact", e))
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::cell::RefCell;

    enum Behavior {
        Write(Vec<u8>),
        Fail,
        Silent,
    }

    /// Resolves to a fixed descriptor and records every delivery
    pub struct FakeManager {
        descriptor: DependencyDescriptor,
        behavior: Behavior,
        deliveries: RefCell<Vec<PathBuf>>,
    }

    impl FakeManager {
        pub fn new(descriptor: DependencyDescriptor, content: &[u8]) -> Self {
            Self::with_behavior(descriptor, Behavior::Write(content.to_vec()))
        }

        pub fn failing(descriptor: DependencyDescriptor) -> Self {
            Self::with_behavior(descriptor, Behavior::Fail)
        }

        /// Reports success without writing anything
        pub fn silent(descriptor: DependencyDescriptor) -> Self {
            Self::with_behavior(descriptor, Behavior::Silent)
        }

        fn with_behavior(descriptor: DependencyDescriptor, behavior: Behavior) -> Self {
            Self {
                descriptor,
                behavior,
                deliveries: RefCell::new(Vec::new()),
            }
        }

        pub fn deliveries(&self) -> Vec<PathBuf> {
            self.deliveries.borrow().clone()
        }
    }

    impl DependencyManager for FakeManager {
        fn resolve(&self, _: &VersionRequirement, _: &str) -> BuildpackResult<DependencyDescriptor> {
            Ok(self.descriptor.clone())
        }

        fn deliver(&self, descriptor: &DependencyDescriptor, destination: &Path) -> BuildpackResult<()> {
            self.deliveries.borrow_mut().push(destination.to_path_buf());
            let target = destination.join(descriptor.artifact_name());
            match &self.behavior {
                Behavior::Write(content) => fs::write(&target, content)
                    .map_err(|e| BuildpackError::delivery(&target, "writing artifact", e)),
                Behavior::Fail => Err(BuildpackError::delivery(
                    &target,
                    "writing artifact",
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only layer"),
                )),
                Behavior::Silent => Ok(()),
            }
        }
    }
}
