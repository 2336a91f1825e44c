//! Detached OpenPGP signature verification
//!
//! The trusted key ring is parsed once at startup and passed around by
//! reference; it is never mutated after construction. A signature is
//! accepted when any primary key or subkey in the ring validates it over
//! the exact artifact bytes.

use crate::error::{BuildpackError, BuildpackResult};
use pgp::types::PublicKeyTrait;
use pgp::{Deserializable, SignedPublicKey, StandaloneSignature};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Composer release signing keys compiled into the binary
pub const RELEASE_KEYRING: &str = include_str!("../../keys/composer-release.asc");

/// Immutable set of public keys trusted to sign releases
#[derive(Debug, Clone)]
pub struct TrustedKeyring {
    keys: Vec<SignedPublicKey>,
}

impl TrustedKeyring {
    /// Parse an ASCII-armored key ring (one or more public key blocks)
    pub fn from_armored(armored: &str) -> BuildpackResult<Self> {
        let (keys, _headers) = SignedPublicKey::from_string_many(armored)
            .map_err(|e| BuildpackError::KeyringInvalid(e.to_string()))?;
        let keys = keys
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BuildpackError::KeyringInvalid(e.to_string()))?;

        if keys.is_empty() {
            return Err(BuildpackError::KeyringInvalid(
                "no public keys found".to_string(),
            ));
        }

        for key in &keys {
            debug!("Trusting key {:x}", key.key_id());
        }

        Ok(Self { keys })
    }

    /// The compiled-in release key ring
    pub fn release() -> BuildpackResult<Self> {
        Self::from_armored(RELEASE_KEYRING).map_err(|e| match e {
            BuildpackError::KeyringInvalid(reason) => {
                BuildpackError::KeyringInvalid(format!("embedded release key ring: {reason}"))
            }
            other => other,
        })
    }

    /// Key ring from `path` when given, otherwise the compiled-in one
    pub fn load(path: Option<&Path>) -> BuildpackResult<Self> {
        match path {
            Some(path) => {
                debug!("Using trusted key ring {}", path.display());
                Self::from_file(path)
            }
            None => Self::release(),
        }
    }

    /// Load and parse a key ring file
    pub fn from_file(path: &Path) -> BuildpackResult<Self> {
        let armored = fs::read_to_string(path).map_err(|e| {
            BuildpackError::io(format!("reading trusted key ring {}", path.display()), e)
        })?;
        Self::from_armored(&armored)
    }

    /// Number of primary keys in the ring
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Verify a detached armored signature over `content`.
    ///
    /// `signature` is the raw companion payload; anything that is not an
    /// armored signature is rejected. `signature_uri` is only used for
    /// error context.
    pub fn verify_detached(
        &self,
        content: &[u8],
        signature: &[u8],
        signature_uri: &str,
    ) -> BuildpackResult<()> {
        let unparsable = |reason: String| BuildpackError::Authenticity {
            signature_uri: signature_uri.to_string(),
            reason: format!("unparsable signature: {reason}"),
        };

        let armored = std::str::from_utf8(signature).map_err(|e| unparsable(e.to_string()))?;
        let (signature, _headers) =
            StandaloneSignature::from_string(armored).map_err(|e| unparsable(e.to_string()))?;

        for key in &self.keys {
            if signature.verify(key, content).is_ok() {
                info!("Signature verified by key {:x}", key.key_id());
                return Ok(());
            }
            for subkey in &key.public_subkeys {
                if signature.verify(subkey, content).is_ok() {
                    info!(
                        "Signature verified by subkey {:x} of {:x}",
                        subkey.key_id(),
                        key.key_id()
                    );
                    return Ok(());
                }
            }
        }

        Err(BuildpackError::Authenticity {
            signature_uri: signature_uri.to_string(),
            reason: "signature not accepted: no trusted key validates it".to_string(),
        })
    }
}
