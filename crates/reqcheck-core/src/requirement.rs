//! A single manifest entry: `name[extras]<specifiers>[; marker]`.

use std::fmt;

use thiserror::Error;

use crate::specifier::{SpecifierError, SpecifierKind, SpecifierSet};
use crate::version::Version;

/// Why a requirement line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementError {
    #[error("requirement has no package name")]
    EmptyName,
    #[error("invalid package name `{0}`")]
    InvalidName(String),
    #[error("invalid extra `{extra}` on `{name}`")]
    InvalidExtra { name: String, extra: String },
    #[error("unclosed `[` in extras of `{0}`")]
    UnclosedExtras(String),
    #[error("`{0}` has no version specifier")]
    MissingSpecifier(String),
    #[error("`{0}` uses a direct URL reference, which cannot be version-checked")]
    DirectReference(String),
    #[error("empty environment marker after `;`")]
    EmptyMarker,
    #[error("invalid specifier for `{name}`: {source}")]
    InvalidSpecifier {
        name: String,
        #[source]
        source: SpecifierError,
    },
}

/// A parsed `(name, constraint)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub normalized_name: String,
    pub extras: Vec<String>,
    pub specifiers: SpecifierSet,
    pub marker: Option<String>,
}

impl Requirement {
    pub fn parse(line: &str) -> Result<Self, RequirementError> {
        let line = line.trim();
        let (body, marker) = match line.split_once(';') {
            Some((body, marker)) => {
                let marker = marker.trim();
                if marker.is_empty() {
                    return Err(RequirementError::EmptyMarker);
                }
                (body.trim_end(), Some(marker.to_string()))
            }
            None => (line, None),
        };

        let name_len = body
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
            .count();
        let name = &body[..name_len];
        if name.is_empty() {
            return Err(RequirementError::EmptyName);
        }
        if !is_valid_name(name) {
            return Err(RequirementError::InvalidName(name.to_string()));
        }

        let mut rest = body[name_len..].trim_start();
        let mut extras = Vec::new();
        if let Some(after) = rest.strip_prefix('[') {
            let (inner, tail) = after
                .split_once(']')
                .ok_or_else(|| RequirementError::UnclosedExtras(name.to_string()))?;
            for extra in inner.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                if !is_valid_name(extra) {
                    return Err(RequirementError::InvalidExtra {
                        name: name.to_string(),
                        extra: extra.to_string(),
                    });
                }
                extras.push(extra.to_string());
            }
            extras.sort();
            extras.dedup();
            rest = tail.trim_start();
        }

        if rest.starts_with('@') {
            return Err(RequirementError::DirectReference(name.to_string()));
        }
        if rest.is_empty() {
            return Err(RequirementError::MissingSpecifier(name.to_string()));
        }
        // Legacy parenthesized form: `name (>=1.0)`.
        let rest = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .unwrap_or(rest);

        let specifiers =
            SpecifierSet::parse(rest).map_err(|source| RequirementError::InvalidSpecifier {
                name: name.to_string(),
                source,
            })?;

        Ok(Self {
            name: name.to_string(),
            normalized_name: normalize_name(name),
            extras,
            specifiers,
            marker,
        })
    }

    /// Constraint kind of the whole specifier set.
    pub fn kind(&self) -> SpecifierKind {
        // `parse` rejects entries without specifiers.
        self.specifiers.kind().unwrap_or(SpecifierKind::LowerBound)
    }

    pub fn is_pinned(&self) -> bool {
        self.specifiers.is_pinned()
    }

    pub fn allows(&self, version: &Version) -> bool {
        self.specifiers.contains(version)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        write!(f, "{}", self.specifiers)?;
        if let Some(marker) = &self.marker {
            write!(f, "; {marker}")?;
        }
        Ok(())
    }
}

/// Lowercase the name and collapse runs of `-`, `_` and `.` into a single `-`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_sep = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !in_sep {
                out.push('-');
            }
            in_sep = true;
        } else {
            out.push(ch.to_ascii_lowercase());
            in_sep = false;
        }
    }
    out
}

/// ASCII alphanumerics with `-`, `_`, `.` allowed only between them.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        }
        _ => false,
    }
}
