//! Manifest discovery and configuration shared by every command.
//!
//! Resolution order for the manifest path:
//! 1. `--manifest PATH` (relative to the working directory)
//! 2. `manifest = "..."` from `reqcheck.toml` / `~/.reqcheck/config.toml`
//! 3. the nearest `requirements.txt` at or above the working directory

use std::path::{Path, PathBuf};

use reqcheck_core::config::Config;
use reqcheck_core::lockfile::DEFAULT_LOCKFILE;
use reqcheck_core::manifest::{Manifest, DEFAULT_MANIFEST};
use reqcheck_util::errors::ReqError;
use reqcheck_util::fs::find_ancestor_with;

/// Resolve which manifest a command operates on.
pub fn locate_manifest(
    cwd: &Path,
    explicit: Option<&Path>,
    config: &Config,
) -> miette::Result<PathBuf> {
    let (path, origin) = match (explicit, &config.manifest) {
        (Some(p), _) => (cwd.join(p), "--manifest"),
        (None, Some(p)) => (p.clone(), "config"),
        (None, None) => match find_ancestor_with(cwd, DEFAULT_MANIFEST) {
            Some(dir) => (dir.join(DEFAULT_MANIFEST), "search"),
            None => {
                return Err(ReqError::Manifest {
                    message: format!(
                        "Could not find {DEFAULT_MANIFEST} in {} or any parent directory",
                        cwd.display()
                    ),
                }
                .into())
            }
        },
    };

    if !path.is_file() {
        return Err(ReqError::Manifest {
            message: format!("{} does not exist", path.display()),
        }
        .into());
    }
    tracing::debug!(path = %path.display(), origin, "located manifest");
    Ok(path)
}

/// Load configuration visible from `cwd` and resolve the manifest path.
pub fn resolve(cwd: &Path, explicit: Option<&Path>) -> miette::Result<PathBuf> {
    let config = Config::load(cwd)?;
    locate_manifest(cwd, explicit, &config)
}

/// Configuration that applies to `manifest_path`.
pub fn load_config(manifest_path: &Path) -> miette::Result<Config> {
    Config::load(manifest_dir(manifest_path))
}

pub fn load_manifest(manifest_path: &Path) -> miette::Result<Manifest> {
    Manifest::from_path(manifest_path)
}

/// Lock file that belongs to `manifest_path`.
pub fn lockfile_path(manifest_path: &Path) -> PathBuf {
    manifest_dir(manifest_path).join(DEFAULT_LOCKFILE)
}

fn manifest_dir(manifest_path: &Path) -> &Path {
    match manifest_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
