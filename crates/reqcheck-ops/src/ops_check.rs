//! Operation: lint the manifest and optionally verify the lock file.
//!
//! Text output goes to stdout as `file:line:col: severity[rule]: message`;
//! parse errors are additionally rendered with their source snippet on
//! stderr. JSON output is the serialized [`Report`].

use std::path::Path;

use reqcheck_core::lockfile::{LockStatus, Lockfile};
use reqcheck_core::manifest::Manifest;
use reqcheck_lint::{Diagnostic, Report};
use reqcheck_util::errors::ReqError;
use reqcheck_util::progress;

use crate::ops_setup;

/// Output format for `reqcheck check`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckFormat {
    #[default]
    Text,
    Json,
}

/// Options for `reqcheck check`.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub format: CheckFormat,
    /// Also fail when `requirements.lock` is missing or stale.
    pub locked: bool,
}

/// Lint the manifest at `manifest_path`. Fails when any error-level finding
/// remains after configuration, or when `locked` and the lock is stale.
pub fn check(manifest_path: &Path, opts: &CheckOptions) -> miette::Result<Report> {
    let config = ops_setup::load_config(manifest_path)?;
    let manifest = ops_setup::load_manifest(manifest_path)?;
    if opts.format == CheckFormat::Text {
        progress::status("Checking", &crate::display_name(manifest_path));
    }

    let report = reqcheck_lint::run(&manifest, &config.lint)?;
    match opts.format {
        CheckFormat::Text => print_text(&manifest, &report),
        CheckFormat::Json => {
            let json = report.to_json().map_err(|e| ReqError::Generic {
                message: format!("Failed to serialize report: {e}"),
            })?;
            println!("{json}");
        }
    }

    let counts = report.counts();
    tracing::info!(
        errors = counts.errors,
        warnings = counts.warnings,
        infos = counts.infos,
        "lint finished"
    );
    if report.has_errors() {
        if opts.format == CheckFormat::Text {
            progress::status_error(
                "Failed",
                &format!(
                    "{} error(s), {} warning(s), {} note(s)",
                    counts.errors, counts.warnings, counts.infos
                ),
            );
        }
        return Err(ReqError::Lint {
            count: counts.errors,
            manifest: manifest.name.clone(),
        }
        .into());
    }

    if opts.locked {
        verify_lock(manifest_path, &manifest)?;
    }

    if opts.format == CheckFormat::Text {
        progress::status(
            "Finished",
            &format!(
                "{} entries, {} warning(s), {} note(s)",
                manifest.entries.len(),
                counts.warnings,
                counts.infos
            ),
        );
    }
    Ok(report)
}

fn print_text(manifest: &Manifest, report: &Report) {
    for err in &manifest.errors {
        eprintln!("{:?}", miette::Report::new(manifest.report(err)));
    }
    for d in &report.diagnostics {
        println!("{}", format_diagnostic(&manifest.name, d));
    }
}

/// One diagnostic in `file:line:col: severity[rule]: message` form, with an
/// indented help line when present.
pub fn format_diagnostic(manifest: &str, d: &Diagnostic) -> String {
    let mut line = format!(
        "{manifest}:{}:{}: {}[{}]: {}",
        d.line, d.column, d.severity, d.rule, d.message
    );
    if let Some(help) = &d.help {
        line.push_str(&format!("\n  = help: {help}"));
    }
    line
}

fn verify_lock(manifest_path: &Path, manifest: &Manifest) -> miette::Result<()> {
    let lock_path = ops_setup::lockfile_path(manifest_path);
    let lock_name = crate::display_name(&lock_path);
    if !lock_path.is_file() {
        return Err(ReqError::Lockfile {
            message: format!("{lock_name} not found"),
        }
        .into());
    }
    let lock = Lockfile::from_path(&lock_path)?;
    match lock.verify(manifest) {
        LockStatus::UpToDate => {
            tracing::debug!(path = %lock_path.display(), "lock file up to date");
            Ok(())
        }
        LockStatus::Stale {
            added,
            removed,
            changed,
        } => {
            let mut parts = Vec::new();
            for (what, names) in [("added", added), ("removed", removed), ("changed", changed)] {
                if !names.is_empty() {
                    parts.push(format!("{what}: {}", names.join(", ")));
                }
            }
            let detail = if parts.is_empty() {
                String::new()
            } else {
                format!(" ({})", parts.join("; "))
            };
            Err(ReqError::Lockfile {
                message: format!("{lock_name} is out of date{detail}"),
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqcheck_lint::Severity;

    #[test]
    fn diagnostic_line_shape() {
        let d = Diagnostic {
            rule: "duplicate".into(),
            severity: Severity::Error,
            line: 4,
            column: 1,
            package: Some("numpy".into()),
            message: "`NumPy` is listed more than once".into(),
            help: Some("keep a single entry per package".into()),
        };
        assert_eq!(
            format_diagnostic("requirements.txt", &d),
            "requirements.txt:4:1: error[duplicate]: `NumPy` is listed more than once\n  = help: keep a single entry per package"
        );
    }
}
