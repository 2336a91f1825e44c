//! Executable installation into a layer

use crate::dependency::{DependencyDescriptor, DependencyManager};
use crate::error::{BuildpackError, BuildpackResult};
use crate::layer::Layer;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Mode of the installed executable: rwxr-xr-x
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Deliver the artifact into `<layer>/bin` and mark it executable.
///
/// Returns the installed path. Any failure leaves the layer without a
/// cache record; the caller writes the record only after this succeeds.
pub fn install(
    manager: &dyn DependencyManager,
    descriptor: &DependencyDescriptor,
    layer: &Layer,
) -> BuildpackResult<PathBuf> {
    let bin_dir = layer.bin_dir();
    fs::create_dir_all(&bin_dir)
        .map_err(|e| BuildpackError::delivery(&bin_dir, "creating bin directory", e))?;

    info!("Installing composer {}", descriptor.version);
    manager.deliver(descriptor, &bin_dir)?;

    let binary = bin_dir.join(descriptor.artifact_name());
    set_executable(&binary)?;

    debug!("Composer installed at {}", binary.display());
    Ok(binary)
}

#[cfg(unix)]
fn set_executable(path: &std::path::Path) -> BuildpackResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(EXECUTABLE_MODE))
        .map_err(|e| BuildpackError::delivery(path, "setting executable permissions", e))
}

#[cfg(not(unix))]
fn set_executable(path: &std::path::Path) -> BuildpackResult<()> {
    fs::metadata(path)
        .map(|_| ())
        .map_err(|e| BuildpackError::delivery(path, "checking installed file", e))
}
