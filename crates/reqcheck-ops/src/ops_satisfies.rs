//! Operation: test a concrete version against the manifest constraint.

use std::path::Path;

use reqcheck_core::requirement::normalize_name;
use reqcheck_core::version::Version;
use reqcheck_util::errors::ReqError;

use crate::ops_setup;

/// Check whether `version` of `name` is allowed by the manifest.
///
/// Prints the verdict on stdout. Returns `Ok(())` only when every entry for
/// `name` admits the version; an unknown package, an invalid version or a
/// rejected version is an error.
pub fn satisfies(manifest_path: &Path, name: &str, version: &str) -> miette::Result<()> {
    let manifest = ops_setup::load_manifest(manifest_path)?;
    let version = Version::parse(version).map_err(|e| ReqError::Generic {
        message: format!("Invalid version '{version}': {e}"),
    })?;

    let wanted = normalize_name(name);
    let entries: Vec<_> = manifest
        .entries
        .iter()
        .filter(|e| e.requirement.normalized_name == wanted)
        .collect();
    if entries.is_empty() {
        return Err(ReqError::Generic {
            message: format!("`{name}` is not listed in {}", manifest.name),
        }
        .into());
    }

    for entry in &entries {
        let req = &entry.requirement;
        tracing::debug!(line = entry.line, requirement = %req, %version, "checking entry");
        if !req.allows(&version) {
            return Err(ReqError::Generic {
                message: format!(
                    "{} {version} does not satisfy `{}` (line {})",
                    req.name, req.specifiers, entry.line
                ),
            }
            .into());
        }
    }

    let req = &entries[0].requirement;
    println!("{} {version} satisfies {}", req.name, req.specifiers);
    Ok(())
}
