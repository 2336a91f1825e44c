//! Verified acquisition pipeline
//!
//! Produces a catalog descriptor for one upstream Composer version:
//!
//! 1. download the artifact and its `.sha256sum` companion
//! 2. verify the checksum (integrity)
//! 3. download the `.asc` companion and verify the detached signature (authenticity)
//! 4. extract the archive to discover licenses
//! 5. assemble the descriptor
//!
//! Every step is a hard gate. A failure aborts the run for this version
//! and no descriptor is produced.

pub mod checksum;
pub mod download;
pub mod extract;
pub mod signature;

pub use checksum::{sha256_hex, verify_checksum};
pub use download::{ArtifactDownloader, Download, HttpTransport, Transport};
pub use extract::{discover_licenses, Extractor, PharExtractor};
pub use signature::TrustedKeyring;

use crate::config::schema::UpstreamConfig;
use crate::dependency::descriptor::{assemble, DependencyDescriptor};
use crate::error::BuildpackResult;
use tracing::info;

/// The three companion URIs published for one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseUris {
    pub artifact: String,
    pub checksum: String,
    pub signature: String,
}

impl ReleaseUris {
    /// Expand the `{version}` placeholder of the configured templates
    pub fn for_version(upstream: &UpstreamConfig, version: &str) -> Self {
        let expand = |template: &str| template.replace("{version}", version);
        Self {
            artifact: expand(&upstream.artifact_url),
            checksum: expand(&upstream.checksum_url),
            signature: expand(&upstream.signature_url),
        }
    }
}

/// Collaborators needed to retrieve and verify a release
pub struct Retriever<'a> {
    downloader: ArtifactDownloader<'a>,
    keyring: &'a TrustedKeyring,
    extractor: &'a dyn Extractor,
}

impl<'a> Retriever<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        keyring: &'a TrustedKeyring,
        extractor: &'a dyn Extractor,
    ) -> Self {
        Self {
            downloader: ArtifactDownloader::new(transport),
            keyring,
            extractor,
        }
    }

    /// Run the full pipeline for `version`
    pub fn generate_metadata(
        &self,
        version: &str,
        uris: &ReleaseUris,
    ) -> BuildpackResult<DependencyDescriptor> {
        info!("Retrieving composer {} from {}", version, uris.artifact);

        let artifact = self.downloader.download(&uris.artifact)?;
        let published = self.downloader.download(&uris.checksum)?;
        let sha256 = verify_checksum(&artifact, &published)?;
        info!("Checksum verified: sha256:{}", sha256);

        let signature = self.downloader.download(&uris.signature)?;
        self.keyring
            .verify_detached(&artifact.bytes, &signature.bytes, &signature.uri)?;

        let licenses = discover_licenses(self.extractor, &artifact.bytes, artifact.file_name())?;

        Ok(assemble(version, &uris.artifact, &sha256, licenses))
    }
}
