use std::path::Path;

use miette::Result;

pub fn exec(manifest: &Path, name: &str, version: &str) -> Result<()> {
    reqcheck_ops::ops_satisfies::satisfies(manifest, name, version)
}
