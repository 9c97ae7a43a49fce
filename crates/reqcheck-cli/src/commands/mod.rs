//! Command dispatch and handler modules.

mod check;
mod fmt;
mod list;
mod lock;
mod satisfies;

use std::path::PathBuf;

use miette::Result;
use reqcheck_util::errors::ReqError;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let manifest = resolve_manifest(cli.manifest.as_deref())?;
    match cli.command {
        Command::Check { format, locked } => check::exec(&manifest, format, locked),
        Command::List { format } => list::exec(&manifest, format),
        Command::Fmt { check, no_sort } => fmt::exec(&manifest, !no_sort, check),
        Command::Lock => lock::exec(&manifest),
        Command::Satisfies { name, version } => satisfies::exec(&manifest, &name, &version),
    }
}

fn resolve_manifest(explicit: Option<&std::path::Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(ReqError::Io)?;
    reqcheck_ops::ops_setup::resolve(&cwd, explicit)
}
