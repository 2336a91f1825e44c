//! Persisted layer record
//!
//! Stored next to the layer as `<layers>/<name>.toml`:
//!
//! ```toml
//! [types]
//! build = true
//! launch = false
//! cache = true
//!
//! [metadata]
//! checksum = "sha256:..."
//! installed-at = "2024-01-01T00:00:00Z"
//! ```

use crate::error::{BuildpackError, BuildpackResult};
use crate::layer::{Layer, LayerFlags};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// State left behind by the last successful install into a layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub checksum: String,
    pub flags: LayerFlags,
    pub path: PathBuf,
    pub installed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordFile {
    #[serde(default)]
    types: LayerFlags,
    #[serde(default)]
    metadata: RecordMetadata,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RecordMetadata {
    #[serde(default)]
    checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    installed_at: Option<DateTime<Utc>>,
}

impl CacheRecord {
    pub fn new(checksum: &str, flags: LayerFlags, path: PathBuf) -> Self {
        Self {
            checksum: checksum.to_string(),
            flags,
            path,
            installed_at: Some(Utc::now()),
        }
    }

    /// Read the record for `layer`.
    ///
    /// A missing file, an unreadable file, or a record without a checksum
    /// all mean "no usable record", which forces a rebuild.
    pub fn load(layer: &Layer) -> Option<Self> {
        let path = layer.metadata_path();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No layer record at {}: {}", path.display(), e);
                return None;
            }
        };

        let file: RecordFile = match toml::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                warn!("Ignoring unreadable layer record {}: {}", path.display(), e);
                return None;
            }
        };

        let checksum = file.metadata.checksum.filter(|c| !c.is_empty())?;
        Some(Self {
            checksum,
            flags: file.types,
            path: layer.path.clone(),
            installed_at: file.metadata.installed_at,
        })
    }

    /// Write the record for `layer`
    pub fn save(&self, layer: &Layer) -> BuildpackResult<()> {
        let file = RecordFile {
            types: self.flags,
            metadata: RecordMetadata {
                checksum: Some(self.checksum.clone()),
                installed_at: self.installed_at,
            },
        };
        let content = toml::to_string_pretty(&file)?;

        let path = layer.metadata_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BuildpackError::io(format!("creating {}", parent.display()), e))?;
        }
        fs::write(path, content)
            .map_err(|e| BuildpackError::io(format!("writing layer record {}", path.display()), e))
    }

    /// Same installation, new flags
    pub fn with_flags(&self, flags: LayerFlags) -> Self {
        Self {
            flags,
            ..self.clone()
        }
    }
}
