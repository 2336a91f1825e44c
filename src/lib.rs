//! Composer buildpack
//!
//! Retrieves Composer releases through a verified acquisition pipeline
//! (checksum, OpenPGP signature, license discovery) and installs the
//! selected version into a build layer that is reused for as long as the
//! resolved checksum does not change.

pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dependency;
pub mod error;
pub mod layer;
pub mod plan;
pub mod retrieval;

pub use error::{BuildpackError, BuildpackResult};
