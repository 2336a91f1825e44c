//! Configuration schema for the Composer buildpack
//!
//! Configuration is stored at `~/.config/composer-buildpack/config.toml`
//! unless `--config` points elsewhere.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Upstream release locations
    pub upstream: UpstreamConfig,

    /// Release signature trust
    pub signing: SigningConfig,

    /// Archive extraction
    pub extract: ExtractConfig,

    /// Dependency catalog
    pub catalog: CatalogConfig,

    /// Build step settings
    pub build: BuildConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Upstream URL templates; `{version}` is replaced with the release version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Release artifact
    pub artifact_url: String,

    /// `sha256sum`-format checksum companion
    pub checksum_url: String,

    /// Detached ASCII-armored signature companion
    pub signature_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        let base = "https://getcomposer.org/download/{version}/composer.phar";
        Self {
            artifact_url: base.to_string(),
            checksum_url: format!("{}.sha256sum", base),
            signature_url: format!("{}.asc", base),
            timeout_secs: 60,
        }
    }
}

/// Signature trust settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// ASCII-armored public key ring trusted to sign releases
    /// (default: the compiled-in Composer release keys)
    pub keyring: Option<PathBuf>,
}

/// Extraction settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Explicit `phar` binary (default: looked up on PATH)
    pub phar: Option<PathBuf>,
}

/// Catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog file read by `build` and written by `retrieve`
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("buildpack.toml"),
        }
    }
}

/// Build step settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build-plan entry name and catalog id
    pub dependency: String,

    /// Layer directory name under the layers root
    pub layer: String,

    /// Version sources, highest priority first
    pub priorities: Vec<String>,

    /// Stack id used to filter catalog entries
    pub stack: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dependency: "composer".to_string(),
            layer: "composer".to_string(),
            priorities: vec![
                "BP_COMPOSER_VERSION".to_string(),
                "composer.json".to_string(),
                "composer.lock".to_string(),
            ],
            stack: "io.buildpacks.stacks.jammy".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[upstream]"));
        assert!(toml.contains("[build]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.build.priorities[0], "BP_COMPOSER_VERSION");
        assert!(config.signing.keyring.is_none());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [upstream]
            artifact_url = "https://mirror.example.test/{version}/composer.phar"

            [signing]
            keyring = "/etc/composer/releases.asc"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.upstream.artifact_url,
            "https://mirror.example.test/{version}/composer.phar"
        );
        assert_eq!(config.upstream.timeout_secs, 60); // default preserved
        assert_eq!(
            config.signing.keyring,
            Some(PathBuf::from("/etc/composer/releases.asc"))
        );
    }
}
