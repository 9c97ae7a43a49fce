//! Operation: snapshot the manifest into `requirements.lock`.

use std::path::{Path, PathBuf};

use reqcheck_core::lockfile::Lockfile;
use reqcheck_util::errors::ReqError;
use reqcheck_util::progress;

use crate::ops_setup;

/// Write the lock file next to `manifest_path` and return its path.
///
/// The manifest must parse cleanly and list each package once.
pub fn lock(manifest_path: &Path) -> miette::Result<PathBuf> {
    let manifest = ops_setup::load_manifest(manifest_path)?;
    manifest.ensure_parsed()?;

    let dups: Vec<&str> = manifest
        .duplicates()
        .iter()
        .map(|g| g[0].requirement.normalized_name.as_str())
        .collect();
    if !dups.is_empty() {
        return Err(ReqError::Manifest {
            message: format!("Cannot lock: duplicate entries for {}", dups.join(", ")),
        }
        .into());
    }

    let lockfile = Lockfile::generate(&manifest);
    let lock_path = ops_setup::lockfile_path(manifest_path);
    lockfile.write_to(&lock_path)?;

    tracing::info!(path = %lock_path.display(), packages = lockfile.package.len(), "wrote lock file");
    progress::status(
        "Locked",
        &format!(
            "{} package(s) to {}",
            lockfile.package.len(),
            crate::display_name(&lock_path)
        ),
    );
    Ok(lock_path)
}
