//! Check command implementation.

use std::path::Path;

use miette::Result;
use reqcheck_ops::ops_check::{self, CheckOptions};

use crate::cli::CheckFormat;

pub fn exec(manifest: &Path, format: CheckFormat, locked: bool) -> Result<()> {
    let opts = CheckOptions {
        format: match format {
            CheckFormat::Text => ops_check::CheckFormat::Text,
            CheckFormat::Json => ops_check::CheckFormat::Json,
        },
        locked,
    };
    ops_check::check(manifest, &opts).map(|_| ())
}
