//! Lock command implementation.

use std::path::Path;

use miette::Result;

pub fn exec(manifest: &Path) -> Result<()> {
    reqcheck_ops::ops_lock::lock(manifest).map(|_| ())
}
