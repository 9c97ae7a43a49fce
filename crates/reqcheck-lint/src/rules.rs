//! Built-in lint rules.

use reqcheck_core::config::LintConfig;
use reqcheck_core::manifest::{Entry, Manifest};
use reqcheck_core::specifier::{Operator, SpecifierKind, SpecifierSet};
use reqcheck_core::version::Version;

use crate::diagnostic::{Diagnostic, Severity};

/// A check over a whole manifest.
pub trait Rule {
    /// Stable id used in `allow`/`deny` lists and in output.
    fn id(&self) -> &'static str;

    fn check(&self, manifest: &Manifest, config: &LintConfig, out: &mut Vec<Diagnostic>);
}

/// Every built-in rule, in reporting order.
pub fn builtin() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ParseErrors),
        Box::new(Duplicates),
        Box::new(ConflictingRange),
        Box::new(Unpinned),
        Box::new(WildcardPin),
        Box::new(PrereleasePin),
        Box::new(Unsorted),
    ]
}

/// Ids of every built-in rule.
pub fn ids() -> Vec<&'static str> {
    builtin().iter().map(|r| r.id()).collect()
}

fn at_entry(
    rule: &dyn Rule,
    severity: Severity,
    entry: &Entry,
    message: String,
    help: Option<&str>,
) -> Diagnostic {
    Diagnostic {
        rule: rule.id().to_string(),
        severity,
        line: entry.line,
        column: entry.column,
        package: Some(entry.requirement.normalized_name.clone()),
        message,
        help: help.map(str::to_string),
    }
}

/// Listing a rule in `deny` switches it on even when its own setting is off.
fn denied(config: &LintConfig, id: &str) -> bool {
    config.deny.iter().any(|d| d == id)
}

pub struct ParseErrors;

impl Rule for ParseErrors {
    fn id(&self) -> &'static str {
        "parse-error"
    }

    fn check(&self, manifest: &Manifest, _config: &LintConfig, out: &mut Vec<Diagnostic>) {
        for err in &manifest.errors {
            out.push(Diagnostic {
                rule: self.id().to_string(),
                severity: Severity::Error,
                line: err.line,
                column: err.column,
                package: None,
                message: err.error.to_string(),
                help: Some("expected `<name><op><version>`, e.g. `numpy==1.22.*`".to_string()),
            });
        }
    }
}

pub struct Duplicates;

impl Rule for Duplicates {
    fn id(&self) -> &'static str {
        "duplicate"
    }

    fn check(&self, manifest: &Manifest, _config: &LintConfig, out: &mut Vec<Diagnostic>) {
        for group in manifest.duplicates() {
            let first = group[0];
            for dup in &group[1..] {
                out.push(at_entry(
                    self,
                    Severity::Error,
                    dup,
                    format!(
                        "`{}` is listed more than once (first at line {} as `{}`)",
                        dup.requirement.name, first.line, first.requirement.name
                    ),
                    Some("keep a single entry per package"),
                ));
            }
        }
    }
}

pub struct ConflictingRange;

impl ConflictingRange {
    /// A reason no version can satisfy `set`, if one is visible without a registry.
    fn conflict(set: &SpecifierSet) -> Option<String> {
        for spec in set {
            if spec.kind() != SpecifierKind::ExactPin {
                continue;
            }
            if let Some(v) = spec.parsed_version() {
                if !set.contains(v) {
                    return Some(format!("`{spec}` is excluded by the rest of `{set}`"));
                }
            }
        }

        let lower = bounds(set, &[Operator::GreaterEqual, Operator::Greater])
            .into_iter()
            .max_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));
        let upper = bounds(set, &[Operator::LessEqual, Operator::Less])
            .into_iter()
            .min_by(|a, b| a.0.cmp(b.0).then(b.1.cmp(&a.1)));

        match (lower, upper) {
            (Some((lo, lo_ex)), Some((hi, hi_ex))) if lo > hi || (lo == hi && (lo_ex || hi_ex)) => {
                Some(format!("lower bound {lo} is not below upper bound {hi} in `{set}`"))
            }
            _ => None,
        }
    }
}

/// Versions behind the given bound operators, with an "exclusive" flag.
fn bounds<'a>(set: &'a SpecifierSet, ops: &[Operator]) -> Vec<(&'a Version, bool)> {
    set.iter()
        .filter(|s| ops.contains(&s.operator()))
        .filter_map(|s| {
            let exclusive = matches!(s.operator(), Operator::Greater | Operator::Less);
            s.parsed_version().map(|v| (v, exclusive))
        })
        .collect()
}

impl Rule for ConflictingRange {
    fn id(&self) -> &'static str {
        "conflicting-range"
    }

    fn check(&self, manifest: &Manifest, _config: &LintConfig, out: &mut Vec<Diagnostic>) {
        for entry in &manifest.entries {
            if let Some(reason) = Self::conflict(&entry.requirement.specifiers) {
                out.push(at_entry(
                    self,
                    Severity::Error,
                    entry,
                    format!("no version of `{}` can match: {reason}", entry.requirement.name),
                    None,
                ));
            }
        }
    }
}

pub struct Unpinned;

impl Rule for Unpinned {
    fn id(&self) -> &'static str {
        "unpinned"
    }

    fn check(&self, manifest: &Manifest, config: &LintConfig, out: &mut Vec<Diagnostic>) {
        let severity = if config.require_pins {
            Severity::Warning
        } else {
            Severity::Info
        };
        for entry in &manifest.entries {
            if entry.requirement.kind() == SpecifierKind::LowerBound {
                out.push(at_entry(
                    self,
                    severity,
                    entry,
                    format!("`{}` only sets a lower bound", entry.requirement),
                    Some("pin with `==X.Y.Z` or `==X.Y.*`, or bound both sides"),
                ));
            }
        }
    }
}

pub struct WildcardPin;

impl Rule for WildcardPin {
    fn id(&self) -> &'static str {
        "wildcard-pin"
    }

    fn check(&self, manifest: &Manifest, config: &LintConfig, out: &mut Vec<Diagnostic>) {
        if config.allow_wildcards && !denied(config, self.id()) {
            return;
        }
        for entry in &manifest.entries {
            if let Some(spec) = entry.requirement.specifiers.iter().find(|s| s.is_wildcard()) {
                out.push(at_entry(
                    self,
                    Severity::Warning,
                    entry,
                    format!(
                        "`{}` uses wildcard `{spec}`",
                        entry.requirement.name
                    ),
                    Some("pin an exact version"),
                ));
            }
        }
    }
}

pub struct PrereleasePin;

impl Rule for PrereleasePin {
    fn id(&self) -> &'static str {
        "prerelease-pin"
    }

    fn check(&self, manifest: &Manifest, _config: &LintConfig, out: &mut Vec<Diagnostic>) {
        for entry in &manifest.entries {
            let pre = entry
                .requirement
                .specifiers
                .iter()
                .filter(|s| s.kind() == SpecifierKind::ExactPin)
                .filter_map(|s| s.parsed_version())
                .find(|v| v.is_prerelease());
            if let Some(v) = pre {
                out.push(at_entry(
                    self,
                    Severity::Info,
                    entry,
                    format!("`{}` is pinned to pre-release {v}", entry.requirement.name),
                    None,
                ));
            }
        }
    }
}

pub struct Unsorted;

impl Rule for Unsorted {
    fn id(&self) -> &'static str {
        "unsorted"
    }

    fn check(&self, manifest: &Manifest, config: &LintConfig, out: &mut Vec<Diagnostic>) {
        if !config.require_sorted && !denied(config, self.id()) {
            return;
        }
        let misplaced = manifest.entries.windows(2).find(|w| {
            w[0].requirement.normalized_name > w[1].requirement.normalized_name
        });
        if let Some(w) = misplaced {
            out.push(at_entry(
                self,
                Severity::Warning,
                &w[1],
                format!(
                    "`{}` should come before `{}`",
                    w[1].requirement.name, w[0].requirement.name
                ),
                Some("run `reqcheck fmt` to sort entries"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(s: &str) -> SpecifierSet {
        SpecifierSet::parse(s).unwrap()
    }

    #[test]
    fn crossing_bounds_conflict() {
        assert!(ConflictingRange::conflict(&set(">=2.0,<1.5")).is_some());
        assert!(ConflictingRange::conflict(&set(">=2.0,<2.0")).is_some());
        assert!(ConflictingRange::conflict(&set(">2.0,<=2.0")).is_some());
        assert!(ConflictingRange::conflict(&set(">=2.0,<=2.0")).is_none());
        assert!(ConflictingRange::conflict(&set(">=1.0,<2.0")).is_none());
    }

    #[test]
    fn tightest_bounds_are_used() {
        assert!(ConflictingRange::conflict(&set(">=1.0,>=3.0,<2.0,<5.0")).is_some());
    }

    #[test]
    fn pins_outside_set_conflict() {
        assert!(ConflictingRange::conflict(&set("==1.0,==2.0")).is_some());
        assert!(ConflictingRange::conflict(&set("==1.0,!=1.0")).is_some());
        assert!(ConflictingRange::conflict(&set("==1.5,>=1.0,<2.0")).is_none());
    }

    #[test]
    fn ids_are_unique() {
        let mut ids = ids();
        let n = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), n);
    }
}
