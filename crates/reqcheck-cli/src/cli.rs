//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "reqcheck",
    version,
    about = "Validate, format and lock Python requirements manifests",
    long_about = "reqcheck checks a requirements.txt-style manifest: every line must be \
                  `<name><op><version>`, each package listed once, and every specifier \
                  valid for its operator."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the manifest (default: nearest requirements.txt)
    #[arg(long, global = true, env = "REQCHECK_MANIFEST")]
    pub manifest: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lint the manifest
    Check {
        /// Output format
        #[arg(long, value_enum, default_value_t = CheckFormat::Text)]
        format: CheckFormat,
        /// Also require requirements.lock to be up to date
        #[arg(long)]
        locked: bool,
    },

    /// List manifest entries
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },

    /// Rewrite the manifest in canonical form
    Fmt {
        /// Only report whether the file would change
        #[arg(long)]
        check: bool,
        /// Keep the current entry order
        #[arg(long)]
        no_sort: bool,
    },

    /// Write requirements.lock next to the manifest
    Lock,

    /// Test whether a version satisfies the manifest constraint
    Satisfies {
        /// Package name (case and separators are ignored)
        name: String,
        /// Candidate version, e.g. 1.22.4
        version: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListFormat {
    Table,
    Json,
}

pub fn parse() -> Cli {
    Cli::parse()
}
