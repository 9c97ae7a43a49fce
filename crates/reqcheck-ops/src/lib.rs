pub mod ops_check;
pub mod ops_fmt;
pub mod ops_list;
pub mod ops_lock;
pub mod ops_satisfies;
pub mod ops_setup;

use std::path::Path;

/// File name of `path` for status lines, falling back to the full path.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
