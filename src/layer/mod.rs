//! Layer directory management
//!
//! A layer is a directory under the layers root (`<layers>/<name>/`) plus
//! a sibling metadata file (`<layers>/<name>.toml`) holding the cache
//! record. The whole layer may be reset and repopulated by a rebuild.

pub mod install;

pub use install::install;

use crate::error::{BuildpackError, BuildpackResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which lifecycle phases a layer contributes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerFlags {
    pub build: bool,
    pub launch: bool,
    pub cache: bool,
}

/// A named layer under a layers root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub path: PathBuf,
    metadata_path: PathBuf,
}

impl Layer {
    pub fn new(layers_dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: layers_dir.join(name),
            metadata_path: layers_dir.join(format!("{}.toml", name)),
        }
    }

    /// Path of the persisted cache record
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Directory the executable is installed into
    pub fn bin_dir(&self) -> PathBuf {
        self.path.join("bin")
    }

    /// Clear the layer: remove its contents and its cache record, then
    /// recreate the empty directory.
    pub fn reset(&self) -> BuildpackResult<()> {
        debug!("Resetting layer {}", self.path.display());

        if self.metadata_path.exists() {
            fs::remove_file(&self.metadata_path).map_err(|e| {
                BuildpackError::io(format!("removing {}", self.metadata_path.display()), e)
            })?;
        }

        if self.path.exists() {
            fs::remove_dir_all(&self.path).map_err(|e| {
                BuildpackError::io(format!("clearing layer {}", self.path.display()), e)
            })?;
        }

        fs::create_dir_all(&self.path)
            .map_err(|e| BuildpackError::io(format!("creating layer {}", self.path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn layer_paths() {
        let layer = Layer::new(Path::new("/layers"), "composer");
        assert_eq!(layer.path, PathBuf::from("/layers/composer"));
        assert_eq!(layer.bin_dir(), PathBuf::from("/layers/composer/bin"));
        assert_eq!(layer.metadata_path(), Path::new("/layers/composer.toml"));
    }

    #[test]
    fn reset_removes_contents_and_record() {
        let temp = TempDir::new().unwrap();
        let layer = Layer::new(temp.path(), "composer");

        fs::create_dir_all(layer.bin_dir()).unwrap();
        fs::write(layer.bin_dir().join("composer.phar"), "old").unwrap();
        fs::write(layer.metadata_path(), "[metadata]\nchecksum = \"old\"\n").unwrap();

        layer.reset().unwrap();

        assert!(layer.path.is_dir());
        assert_eq!(fs::read_dir(&layer.path).unwrap().count(), 0);
        assert!(!layer.metadata_path().exists());
    }

    #[test]
    fn reset_creates_missing_layer() {
        let temp = TempDir::new().unwrap();
        let layer = Layer::new(temp.path(), "composer");
        layer.reset().unwrap();
        assert!(layer.path.is_dir());
    }
}
