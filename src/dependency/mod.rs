//! Dependency descriptors and the catalog that stores them
//!
//! A descriptor is produced once by the retrieval pipeline and never
//! mutated afterwards. Its `checksum` is the identity used for catalog
//! uniqueness and for layer reuse.

pub mod catalog;
pub mod delivery;
pub mod descriptor;

pub use catalog::Catalog;
pub use delivery::{CatalogDependencyManager, DependencyManager};
pub use descriptor::{assemble, BomEntry, DependencyDescriptor, DEPENDENCY_ID};
