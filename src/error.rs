//! Error types for the Composer buildpack
//!
//! All modules use `BuildpackResult<T>` as their return type. The five
//! acquisition/install kinds (`Retrieval`, `Integrity`, `Authenticity`,
//! `Extraction`, `Delivery`) are terminal: nothing retries them.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildpack operations
pub type BuildpackResult<T> = Result<T, BuildpackError>;

/// All errors that can occur while retrieving or installing Composer
#[derive(Error, Debug)]
pub enum BuildpackError {
    // Acquisition errors
    #[error("Failed to retrieve {uri}: {reason}")]
    Retrieval { uri: String, reason: String },

    #[error(
        "Checksum mismatch: downloaded SHA256 of '{actual}' should match expected checksum of '{expected}' from '{source_uri}'"
    )]
    Integrity {
        expected: String,
        actual: String,
        source_uri: String,
    },

    #[error("Could not verify signature from {signature_uri}: {reason}")]
    Authenticity {
        signature_uri: String,
        reason: String,
    },

    #[error("Failed to extract {archive}: {reason}")]
    Extraction { archive: String, reason: String },

    #[error("Failed to deliver {target}: {context}")]
    Delivery {
        target: PathBuf,
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Catalog and resolution errors
    #[error("Catalog conflict for version {version}: existing checksum {existing}, new checksum {incoming}")]
    CatalogConflict {
        version: String,
        existing: String,
        incoming: String,
    },

    #[error("No version of {id} matches '{constraint}' for stack {stack}. Available: {available}")]
    NoMatchingVersion {
        id: String,
        constraint: String,
        stack: String,
        available: String,
    },

    #[error("Invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    #[error("Build plan has no entry for {0}")]
    NoPlanEntry(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid trusted key ring: {0}")]
    KeyringInvalid(String),

    #[error("Invalid build plan at {path}: {reason}")]
    PlanInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl BuildpackError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a retrieval error for a URI
    pub fn retrieval(uri: impl Into<String>, reason: impl ToString) -> Self {
        Self::Retrieval {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a delivery error for a path on disk
    pub fn delivery(
        target: impl Into<PathBuf>,
        context: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Delivery {
            target: target.into(),
            context: context.into(),
            source,
        }
    }

    /// Create an extraction error
    pub fn extraction(archive: impl Into<String>, reason: impl ToString) -> Self {
        Self::Extraction {
            archive: archive.into(),
            reason: reason.to_string(),
        }
    }

    /// Integrity and authenticity failures are security gates, never transient
    pub fn is_security_failure(&self) -> bool {
        matches!(self, Self::Integrity { .. } | Self::Authenticity { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Integrity { .. } => {
                Some("The upstream artifact does not match its published checksum; do not retry with another source")
            }
            Self::Authenticity { .. } => {
                Some("Check that the trusted key ring contains the current release signing key")
            }
            Self::Extraction { .. } => Some("Install PHP with the phar extension, or set [extract] phar"),
            Self::KeyringInvalid(_) => Some("Set [signing] keyring to an ASCII-armored public key file"),
            Self::NoMatchingVersion { .. } => Some("Run: composer-buildpack catalog list"),
            _ => None,
        }
    }
}
