use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use reqcheck_util::errors::ReqError;
use reqcheck_util::hash::sha256_str;

use crate::manifest::{Manifest, RenderOptions};
use crate::specifier::SpecifierKind;

/// Default lock file name, written next to the manifest.
pub const DEFAULT_LOCKFILE: &str = "requirements.lock";

/// Current lock file format version.
pub const LOCK_VERSION: u32 = 1;

/// Snapshot of a manifest's entries plus a checksum of its canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lockfile {
    pub version: u32,
    /// Manifest file name the lock was generated from.
    pub manifest: String,
    pub checksum: String,
    #[serde(default)]
    pub package: Vec<LockedPackage>,
}

/// A single locked entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub specifier: String,
    pub kind: SpecifierKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

/// Result of comparing a lock file against the current manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockStatus {
    UpToDate,
    Stale {
        added: Vec<String>,
        removed: Vec<String>,
        changed: Vec<String>,
    },
}

impl LockStatus {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, LockStatus::UpToDate)
    }
}

/// Checksum over the sorted, comment-free rendering of `manifest`.
pub fn manifest_checksum(manifest: &Manifest) -> String {
    sha256_str(&manifest.render(RenderOptions {
        sort: true,
        comments: false,
    }))
}

impl Lockfile {
    /// Snapshot `manifest`. Packages are keyed and ordered by normalized name.
    pub fn generate(manifest: &Manifest) -> Self {
        let mut package: Vec<LockedPackage> = manifest
            .requirements()
            .map(|req| LockedPackage {
                name: req.normalized_name.clone(),
                specifier: req.specifiers.to_string(),
                kind: req.kind(),
                extras: req.extras.clone(),
                marker: req.marker.clone(),
            })
            .collect();
        package.sort_by(|a, b| a.name.cmp(&b.name));

        let manifest_name = Path::new(&manifest.name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| manifest.name.clone());

        Self {
            version: LOCK_VERSION,
            manifest: manifest_name,
            checksum: manifest_checksum(manifest),
            package,
        }
    }

    /// Load and parse a `requirements.lock` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReqError::Lockfile {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let lock: Lockfile = toml::from_str(&content).map_err(|e| ReqError::Lockfile {
            message: format!("Failed to parse {}: {e}", path.display()),
        })?;
        if lock.version != LOCK_VERSION {
            return Err(ReqError::Lockfile {
                message: format!(
                    "Unsupported lock file version {} (expected {LOCK_VERSION})",
                    lock.version
                ),
            }
            .into());
        }
        Ok(lock)
    }

    /// Serialize the lockfile to a pretty-printed TOML string.
    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn write_to(&self, path: &Path) -> miette::Result<()> {
        let content = self.to_string_pretty().map_err(|e| ReqError::Lockfile {
            message: format!("Failed to serialize lock file: {e}"),
        })?;
        reqcheck_util::fs::write_atomic(path, &content).map_err(ReqError::Io)?;
        Ok(())
    }

    /// Compare against the current manifest.
    pub fn verify(&self, manifest: &Manifest) -> LockStatus {
        if self.checksum == manifest_checksum(manifest) {
            return LockStatus::UpToDate;
        }

        let current = Lockfile::generate(manifest);
        let old: BTreeMap<&str, &LockedPackage> =
            self.package.iter().map(|p| (p.name.as_str(), p)).collect();
        let new: BTreeMap<&str, &LockedPackage> =
            current.package.iter().map(|p| (p.name.as_str(), p)).collect();

        let added = new
            .keys()
            .filter(|k| !old.contains_key(*k))
            .map(|k| k.to_string())
            .collect();
        let removed = old
            .keys()
            .filter(|k| !new.contains_key(*k))
            .map(|k| k.to_string())
            .collect();
        let changed = new
            .iter()
            .filter(|(k, p)| old.get(*k).is_some_and(|o| o != *p))
            .map(|(k, _)| k.to_string())
            .collect();

        LockStatus::Stale {
            added,
            removed,
            changed,
        }
    }
}
