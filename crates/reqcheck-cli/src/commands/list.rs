use std::path::Path;

use miette::Result;
use reqcheck_ops::ops_list;

use crate::cli::ListFormat;

pub fn exec(manifest: &Path, format: ListFormat) -> Result<()> {
    let format = match format {
        ListFormat::Table => ops_list::ListFormat::Table,
        ListFormat::Json => ops_list::ListFormat::Json,
    };
    ops_list::list(manifest, format).map(|_| ())
}
