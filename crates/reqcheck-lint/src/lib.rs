//! Lint engine for requirements manifests.
//!
//! [`run`] applies every built-in [`rules::Rule`] to a parsed manifest, then
//! applies the `[lint]` configuration: `allow` drops a rule, `deny` promotes
//! it to an error, and `ignore` globs skip matching packages.

pub mod diagnostic;
pub mod rules;

use globset::{Glob, GlobSet, GlobSetBuilder};

use reqcheck_core::config::LintConfig;
use reqcheck_core::manifest::Manifest;
use reqcheck_util::errors::ReqError;

pub use diagnostic::{Counts, Diagnostic, Report, Severity};

/// Lint `manifest` with the given settings.
pub fn run(manifest: &Manifest, config: &LintConfig) -> miette::Result<Report> {
    let ignore = build_ignore(&config.ignore)?;

    let mut diagnostics = Vec::new();
    for rule in rules::builtin() {
        if config.allow.iter().any(|a| a == rule.id()) {
            tracing::debug!(rule = rule.id(), "rule allowed, skipping");
            continue;
        }
        let before = diagnostics.len();
        rule.check(manifest, config, &mut diagnostics);
        tracing::debug!(rule = rule.id(), found = diagnostics.len() - before, "rule finished");
    }

    diagnostics.retain(|d: &Diagnostic| match &d.package {
        Some(pkg) => !ignore.is_match(pkg),
        None => true,
    });
    for d in &mut diagnostics {
        if config.deny.iter().any(|id| id == &d.rule) {
            d.severity = Severity::Error;
        }
    }
    diagnostics.sort_by_key(|d| (d.line, d.column));

    Ok(Report {
        manifest: manifest.name.clone(),
        diagnostics,
    })
}

fn build_ignore(patterns: &[String]) -> miette::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ReqError::Config {
            message: format!("Invalid ignore pattern '{pattern}': {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| {
        ReqError::Config {
            message: format!("Failed to build ignore set: {e}"),
        }
        .into()
    })
}
