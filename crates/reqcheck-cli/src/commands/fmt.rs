//! Fmt command implementation.

use std::path::Path;

use miette::Result;

pub fn exec(manifest: &Path, sort: bool, check: bool) -> Result<()> {
    reqcheck_ops::ops_fmt::fmt(manifest, sort, check).map(|_| ())
}
