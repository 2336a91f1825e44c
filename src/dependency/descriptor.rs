//! Dependency descriptor assembly
//!
//! Combines verified artifact metadata into the canonical catalog record.
//! Assembly is pure: every input has already passed the checksum and
//! signature gates.

use serde::{Deserialize, Serialize};

/// Catalog id and name of the dependency
pub const DEPENDENCY_ID: &str = "composer";

/// Checksum algorithm prefix used in checksum-qualified strings
pub const CHECKSUM_ALGORITHM: &str = "sha256";

/// Target-software tag embedded in the CPE. Kept as a fixed literal.
const CPE_TARGET_SOFTWARE: &str = "python";

/// Verified, checksum-qualified metadata for one Composer version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyDescriptor {
    pub id: String,
    pub name: String,
    pub version: String,

    /// Where the artifact was retrieved from
    pub source: String,

    /// `sha256:<hex>` of the source artifact
    pub source_checksum: String,

    /// Download location used at build time
    pub uri: String,

    /// `sha256:<hex>` of the raw artifact bytes
    pub checksum: String,

    pub purl: String,
    pub cpe: String,

    #[serde(default)]
    pub licenses: Vec<String>,

    #[serde(default)]
    pub stacks: Vec<String>,
}

impl DependencyDescriptor {
    /// Hex digest without the algorithm prefix
    pub fn checksum_hex(&self) -> &str {
        strip_algorithm(&self.checksum)
    }

    /// Base name of the artifact, used as the installed file name
    pub fn artifact_name(&self) -> &str {
        base_name(&self.uri)
    }

    /// Whether this descriptor can be used on the given stack
    pub fn supports_stack(&self, stack: &str) -> bool {
        self.stacks.iter().any(|s| s == "*" || s == stack)
    }

    /// Bill-of-materials entry for this dependency
    pub fn bom_entry(&self) -> BomEntry {
        BomEntry {
            name: self.name.clone(),
            version: self.version.clone(),
            checksum: self.checksum.clone(),
            purl: self.purl.clone(),
            cpe: self.cpe.clone(),
            licenses: self.licenses.clone(),
        }
    }
}

/// Bill-of-materials entry refreshed on every build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomEntry {
    pub name: String,
    pub version: String,
    pub checksum: String,
    pub purl: String,
    pub cpe: String,
    pub licenses: Vec<String>,
}

/// Assemble a descriptor from verified artifact metadata.
///
/// `sha256` is the bare hex digest; the descriptor stores it
/// algorithm-qualified.
pub fn assemble(
    version: &str,
    source_uri: &str,
    sha256: &str,
    licenses: Vec<String>,
) -> DependencyDescriptor {
    let checksum = format!("{}:{}", CHECKSUM_ALGORITHM, sha256);

    DependencyDescriptor {
        id: DEPENDENCY_ID.to_string(),
        name: DEPENDENCY_ID.to_string(),
        version: version.to_string(),
        source: source_uri.to_string(),
        source_checksum: checksum.clone(),
        uri: source_uri.to_string(),
        checksum,
        purl: package_url(DEPENDENCY_ID, version, sha256, source_uri),
        cpe: format!(
            "cpe:2.3:a:getcomposer:composer:{}:*:*:*:*:{}:*:*",
            version, CPE_TARGET_SOFTWARE
        ),
        licenses,
        stacks: vec!["*".to_string()],
    }
}

/// Generic package URL embedding the checksum and download location
fn package_url(name: &str, version: &str, sha256: &str, uri: &str) -> String {
    format!(
        "pkg:generic/{}@{}?checksum={}&download_url={}",
        name, version, sha256, uri
    )
}

/// Drop an `algorithm:` prefix if present
pub fn strip_algorithm(checksum: &str) -> &str {
    checksum
        .split_once(':')
        .map(|(_, hex)| hex)
        .unwrap_or(checksum)
}

/// Last path segment of a URI or path
pub fn base_name(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}
