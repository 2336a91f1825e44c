//! Archive extraction and license discovery
//!
//! Extraction is delegated to an `Extractor` so the mechanism (the `phar`
//! CLI, an embedded library) can change without touching the pipeline.
//! The extracted tree is only inspected for license files.

use crate::error::{BuildpackError, BuildpackResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;
use walkdir::WalkDir;

/// How deep below the extraction root license files are searched for
const LICENSE_SEARCH_DEPTH: usize = 4;

/// Extracts an archive's file tree into a directory
pub trait Extractor {
    /// Extract `archive` (named `file_name`) into `destination`
    fn extract(&self, archive: &[u8], file_name: &str, destination: &Path) -> BuildpackResult<()>;
}

/// Extracts phar archives with the `phar` command-line tool
#[derive(Debug, Clone)]
pub struct PharExtractor {
    binary: PathBuf,
}

impl PharExtractor {
    /// Use an explicit `phar` binary
    pub fn with_binary(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Locate `phar` on PATH
    pub fn from_path() -> BuildpackResult<Self> {
        let binary = which::which("phar")
            .map_err(|e| BuildpackError::extraction("phar", format!("phar binary not found: {e}")))?;
        debug!("Using phar at {}", binary.display());
        Ok(Self { binary })
    }
}

impl Extractor for PharExtractor {
    fn extract(&self, archive: &[u8], file_name: &str, destination: &Path) -> BuildpackResult<()> {
        let archive_path = destination.join(file_name);
        fs::write(&archive_path, archive)
            .map_err(|e| BuildpackError::extraction(file_name, format!("writing archive: {e}")))?;

        let output = Command::new(&self.binary)
            .current_dir(destination)
            .arg("extract")
            .arg("-f")
            .arg(&archive_path)
            .output()
            .map_err(|e| {
                BuildpackError::extraction(
                    file_name,
                    format!("running {}: {e}", self.binary.display()),
                )
            })?;

        if !output.status.success() {
            return Err(BuildpackError::extraction(
                file_name,
                format!(
                    "{} exited with {}: {}",
                    self.binary.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        fs::remove_file(&archive_path)
            .map_err(|e| BuildpackError::extraction(file_name, format!("removing archive copy: {e}")))
    }
}

/// Extract `archive` into a scratch directory and identify its licenses.
///
/// Fails when no recognizable license is found.
pub fn discover_licenses(
    extractor: &dyn Extractor,
    archive: &[u8],
    file_name: &str,
) -> BuildpackResult<Vec<String>> {
    let scratch = tempfile::tempdir()
        .map_err(|e| BuildpackError::extraction(file_name, format!("creating scratch dir: {e}")))?;

    extractor.extract(archive, file_name, scratch.path())?;

    let licenses = scan_licenses(scratch.path())?;
    if licenses.is_empty() {
        return Err(BuildpackError::extraction(
            file_name,
            "no license file found in archive",
        ));
    }

    debug!("Discovered licenses: {}", licenses.join(", "));
    Ok(licenses)
}

/// Classify every license file under `root`, sorted and de-duplicated
pub fn scan_licenses(root: &Path) -> BuildpackResult<Vec<String>> {
    let mut licenses = Vec::new();

    for entry in WalkDir::new(root).max_depth(LICENSE_SEARCH_DEPTH) {
        let entry = entry.map_err(|e| {
            BuildpackError::extraction(root.display().to_string(), format!("walking tree: {e}"))
        })?;
        if !entry.file_type().is_file() || !is_license_file(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let bytes = fs::read(entry.path())
            .map_err(|e| BuildpackError::io(format!("reading {}", entry.path().display()), e))?;
        if let Some(id) = classify_license(&String::from_utf8_lossy(&bytes)) {
            debug!("{} looks like {}", entry.path().display(), id);
            licenses.push(id.to_string());
        }
    }

    licenses.sort();
    licenses.dedup();
    Ok(licenses)
}

fn is_license_file(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    ["LICENSE", "LICENCE", "COPYING"]
        .iter()
        .any(|prefix| upper.starts_with(prefix))
}

/// Map license text to an SPDX identifier
fn classify_license(text: &str) -> Option<&'static str> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    // Order matters: LGPL text mentions the GPL, BSD-3 contains BSD-2.
    const SIGNATURES: &[(&str, &str)] = &[
        ("Permission is hereby granted, free of charge", "MIT"),
        ("Apache License Version 2.0", "Apache-2.0"),
        ("Mozilla Public License Version 2.0", "MPL-2.0"),
        ("GNU LESSER GENERAL PUBLIC LICENSE Version 3", "LGPL-3.0"),
        ("GNU GENERAL PUBLIC LICENSE Version 3", "GPL-3.0"),
        ("GNU GENERAL PUBLIC LICENSE Version 2", "GPL-2.0"),
        ("Neither the name of", "BSD-3-Clause"),
        ("Redistribution and use in source and binary forms", "BSD-2-Clause"),
        ("Permission to use, copy, modify, and/or distribute this software", "ISC"),
    ];

    SIGNATURES
        .iter()
        .find(|(needle, _)| normalized.contains(needle))
        .map(|(_, id)| *id)
}
