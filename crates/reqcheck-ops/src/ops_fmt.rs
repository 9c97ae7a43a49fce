//! Operation: rewrite the manifest in canonical form.

use std::path::Path;

use reqcheck_core::manifest::RenderOptions;
use reqcheck_util::errors::ReqError;
use reqcheck_util::progress;

use crate::ops_setup;

/// Outcome of [`fmt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmtOutcome {
    Unchanged,
    /// The file was rewritten.
    Formatted,
    /// `check` mode: the file would be rewritten.
    WouldFormat,
}

/// Canonicalize the manifest at `manifest_path`.
///
/// Refuses to touch a manifest with unparseable lines, since those would be
/// lost. In `check` mode nothing is written and a file that would change is
/// an error.
pub fn fmt(manifest_path: &Path, sort: bool, check: bool) -> miette::Result<FmtOutcome> {
    let manifest = ops_setup::load_manifest(manifest_path)?;
    manifest.ensure_parsed()?;

    let rendered = manifest.render(RenderOptions {
        sort,
        comments: true,
    });
    let name = crate::display_name(manifest_path);

    if rendered == manifest.source {
        progress::status_info("Unchanged", &name);
        return Ok(FmtOutcome::Unchanged);
    }

    if check {
        tracing::debug!(path = %manifest_path.display(), "manifest differs from canonical form");
        return Err(ReqError::Generic {
            message: format!("{name} is not formatted; run `reqcheck fmt` to fix it"),
        }
        .into());
    }

    reqcheck_util::fs::write_atomic(manifest_path, &rendered).map_err(ReqError::Io)?;
    progress::status("Formatted", &name);
    Ok(FmtOutcome::Formatted)
}
