//! Checksum verification against the published `sha256sum` companion
//!
//! The companion file has the `sha256sum` layout `<hex>  <filename>`.
//! The downloaded bytes are rendered in the same layout and compared
//! against the trimmed published text.

use crate::error::{BuildpackError, BuildpackResult};
use crate::retrieval::download::Download;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Hex-encoded SHA256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Verify `artifact` against the published checksum file.
///
/// Returns the verified hex digest.
pub fn verify_checksum(artifact: &Download, published: &Download) -> BuildpackResult<String> {
    let digest = sha256_hex(&artifact.bytes);
    let actual = format!("{}  {}", digest, artifact.file_name());
    // Undecodable bytes cannot match the rendered digest
    let published_text = String::from_utf8_lossy(&published.bytes);
    let expected = published_text.trim();

    debug!("Comparing {} against {}", actual, published.uri);

    if expected.is_empty() || actual != expected {
        return Err(BuildpackError::Integrity {
            expected: expected.to_string(),
            actual,
            source_uri: published.uri.clone(),
        });
    }

    Ok(digest)
}
