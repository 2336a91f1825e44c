//! Reuse-or-rebuild decision

use crate::cache::record::CacheRecord;
use serde::Serialize;
use std::fmt;

/// Outcome of comparing the resolved checksum against the layer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "decision")]
pub enum CacheDecision {
    /// Layer contents are trusted as-is
    Reuse,
    /// Layer must be cleared and reinstalled
    Rebuild {
        /// Checksum of the replaced installation, if any
        previous: Option<String>,
    },
}

impl CacheDecision {
    pub fn decide(resolved_checksum: &str, previous: Option<&CacheRecord>) -> Self {
        match previous {
            Some(record) if record.checksum == resolved_checksum => Self::Reuse,
            Some(record) => Self::Rebuild {
                previous: Some(record.checksum.clone()),
            },
            None => Self::Rebuild { previous: None },
        }
    }

    pub fn is_reuse(&self) -> bool {
        matches!(self, Self::Reuse)
    }
}

impl fmt::Display for CacheDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reuse => write!(f, "reuse"),
            Self::Rebuild { previous: None } => write!(f, "rebuild (no cached layer)"),
            Self::Rebuild {
                previous: Some(checksum),
            } => write!(f, "rebuild (replacing {})", checksum),
        }
    }
}
