//! Artifact download
//!
//! One blocking fetch per URI. There is no retry and no partial-read
//! recovery: any transport failure ends the current retrieval run.

use crate::error::{BuildpackError, BuildpackResult};
use std::time::Duration;
use tracing::debug;

/// Largest payload accepted from upstream (composer.phar is a few MB)
const MAX_DOWNLOAD_BYTES: u64 = 128 * 1024 * 1024;

/// Blocking byte transport
pub trait Transport {
    /// Fetch the complete payload at `uri`
    fn fetch(&self, uri: &str) -> BuildpackResult<Vec<u8>>;
}

/// HTTP(S) transport backed by a `ureq` agent
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Create a transport whose requests fail after `timeout`
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent }
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, uri: &str) -> BuildpackResult<Vec<u8>> {
        debug!("GET {}", uri);

        let mut response = self
            .agent
            .get(uri)
            .call()
            .map_err(|e| BuildpackError::retrieval(uri, e))?;

        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_DOWNLOAD_BYTES)
            .read_to_vec()
            .map_err(|e| BuildpackError::retrieval(uri, e))?;

        debug!("Fetched {} bytes from {}", bytes.len(), uri);
        Ok(bytes)
    }
}

/// Payload fetched from a URI
#[derive(Debug, Clone)]
pub struct Download {
    pub uri: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Base name of the URI
    pub fn file_name(&self) -> &str {
        crate::dependency::descriptor::base_name(&self.uri)
    }
}

/// Fetches artifacts and their companions through a transport
pub struct ArtifactDownloader<'a> {
    transport: &'a dyn Transport,
}

impl<'a> ArtifactDownloader<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    pub fn download(&self, uri: &str) -> BuildpackResult<Download> {
        let bytes = self.transport.fetch(uri)?;
        Ok(Download {
            uri: uri.to_string(),
            bytes,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::FakeTransport;
    use super::*;

    #[test]
    fn download_returns_payload() {
        let transport = FakeTransport::default().with("https://example.test/a/composer.phar", "bytes");
        let download = ArtifactDownloader::new(&transport)
            .download("https://example.test/a/composer.phar")
            .unwrap();

        assert_eq!(download.bytes, b"bytes");
        assert_eq!(download.file_name(), "composer.phar");
    }

    #[test]
    fn missing_uri_is_retrieval_error_with_uri() {
        let transport = FakeTransport::default();
        let err = ArtifactDownloader::new(&transport)
            .download("https://example.test/missing")
            .unwrap_err();

        assert!(matches!(err, BuildpackError::Retrieval { ref uri, .. } if uri == "https://example.test/missing"));
    }
}
