//! Version specifiers: `==1.22.*`, `>=2022.12.7`, `~=3.1`, and comma-separated sets of them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::version::{Version, VersionError};

/// Comparison operator in front of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
    Compatible,
    Arbitrary,
}

impl Operator {
    // Longest spelling first so `===` is not read as `==` + `=`.
    const ALL: [(&'static str, Operator); 8] = [
        ("===", Operator::Arbitrary),
        ("==", Operator::Equal),
        ("!=", Operator::NotEqual),
        (">=", Operator::GreaterEqual),
        ("<=", Operator::LessEqual),
        ("~=", Operator::Compatible),
        (">", Operator::Greater),
        ("<", Operator::Less),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::Compatible => "~=",
            Operator::Arbitrary => "===",
        }
    }

    /// Split a leading operator off `s`.
    fn split(s: &str) -> Option<(Operator, &str)> {
        Operator::ALL
            .iter()
            .find_map(|(text, op)| s.strip_prefix(*text).map(|rest| (*op, rest)))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a specifier (or specifier set) constrains the package to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecifierKind {
    /// `==1.22.4`
    ExactPin,
    /// `==1.22.*`
    WildcardPin,
    /// `===foo`
    Arbitrary,
    /// `~=1.22`
    Compatible,
    /// A set with both a lower and an upper bound.
    Range,
    /// `>=` or `>`
    LowerBound,
    /// `<=` or `<`
    UpperBound,
    /// `!=`
    Exclusion,
}

impl SpecifierKind {
    pub fn is_pin(self) -> bool {
        matches!(
            self,
            SpecifierKind::ExactPin | SpecifierKind::WildcardPin | SpecifierKind::Arbitrary
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpecifierKind::ExactPin => "exact-pin",
            SpecifierKind::WildcardPin => "wildcard-pin",
            SpecifierKind::Arbitrary => "arbitrary",
            SpecifierKind::Compatible => "compatible",
            SpecifierKind::Range => "range",
            SpecifierKind::LowerBound => "lower-bound",
            SpecifierKind::UpperBound => "upper-bound",
            SpecifierKind::Exclusion => "exclusion",
        }
    }
}

impl fmt::Display for SpecifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a specifier was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecifierError {
    #[error("empty version specifier")]
    Empty,
    #[error("expected a comparison operator (==, >=, ...) before `{0}`")]
    MissingOperator(String),
    #[error("operator `{0}` is missing a version")]
    MissingVersion(Operator),
    #[error("invalid version after `{op}`: {source}")]
    InvalidVersion {
        op: Operator,
        #[source]
        source: VersionError,
    },
    #[error("wildcard `.*` is only allowed with `==` and `!=`, not `{0}`")]
    WildcardNotAllowed(Operator),
    #[error("wildcard prefix `{0}` must be a plain release such as `1.22`")]
    InvalidWildcardPrefix(String),
    #[error("local version label is only allowed with `==` and `!=`, not `{0}`")]
    LocalNotAllowed(Operator),
    #[error("`~=` needs at least two release segments, got `{0}`")]
    CompatibleTooShort(String),
}

/// The right-hand side of a specifier after validation.
#[derive(Debug, Clone)]
enum Target {
    Version(Version),
    Wildcard { epoch: u64, prefix: Vec<u64> },
    Arbitrary(String),
}

/// A single `<op><version>` clause.
#[derive(Debug, Clone)]
pub struct Specifier {
    op: Operator,
    version: String,
    target: Target,
}

impl Specifier {
    pub fn parse(text: &str) -> Result<Self, SpecifierError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpecifierError::Empty);
        }
        let (op, rest) =
            Operator::split(text).ok_or_else(|| SpecifierError::MissingOperator(text.to_string()))?;
        let version = rest.trim();
        if version.is_empty() {
            return Err(SpecifierError::MissingVersion(op));
        }

        let target = match op {
            Operator::Arbitrary => Target::Arbitrary(version.to_string()),
            _ => match version.strip_suffix(".*") {
                Some(prefix) => {
                    if !matches!(op, Operator::Equal | Operator::NotEqual) {
                        return Err(SpecifierError::WildcardNotAllowed(op));
                    }
                    let parsed = Version::parse(prefix)
                        .map_err(|source| SpecifierError::InvalidVersion { op, source })?;
                    if !parsed.is_plain_release() {
                        return Err(SpecifierError::InvalidWildcardPrefix(prefix.to_string()));
                    }
                    Target::Wildcard {
                        epoch: parsed.epoch(),
                        prefix: parsed.release().to_vec(),
                    }
                }
                None => {
                    let parsed = Version::parse(version)
                        .map_err(|source| SpecifierError::InvalidVersion { op, source })?;
                    if !parsed.local().is_empty()
                        && !matches!(op, Operator::Equal | Operator::NotEqual)
                    {
                        return Err(SpecifierError::LocalNotAllowed(op));
                    }
                    if op == Operator::Compatible && parsed.release().len() < 2 {
                        return Err(SpecifierError::CompatibleTooShort(version.to_string()));
                    }
                    Target::Version(parsed)
                }
            },
        };

        Ok(Self {
            op,
            version: version.to_string(),
            target,
        })
    }

    pub fn operator(&self) -> Operator {
        self.op
    }

    /// Version text exactly as written, e.g. `1.22.*`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Parsed version, `None` for wildcard and `===` specifiers.
    pub fn parsed_version(&self) -> Option<&Version> {
        match &self.target {
            Target::Version(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.target, Target::Wildcard { .. })
    }

    pub fn kind(&self) -> SpecifierKind {
        match (self.op, &self.target) {
            (Operator::Equal, Target::Wildcard { .. }) => SpecifierKind::WildcardPin,
            (Operator::Equal, _) => SpecifierKind::ExactPin,
            (Operator::Arbitrary, _) => SpecifierKind::Arbitrary,
            (Operator::NotEqual, _) => SpecifierKind::Exclusion,
            (Operator::GreaterEqual | Operator::Greater, _) => SpecifierKind::LowerBound,
            (Operator::LessEqual | Operator::Less, _) => SpecifierKind::UpperBound,
            (Operator::Compatible, _) => SpecifierKind::Compatible,
        }
    }

    /// Whether `candidate` satisfies this clause.
    pub fn contains(&self, candidate: &Version) -> bool {
        match &self.target {
            Target::Arbitrary(text) => candidate.as_str().eq_ignore_ascii_case(text),
            Target::Wildcard { epoch, prefix } => {
                let hit = candidate.release_starts_with(*epoch, prefix);
                match self.op {
                    Operator::NotEqual => !hit,
                    _ => hit,
                }
            }
            Target::Version(spec) => {
                // A specifier without a local label ignores the candidate's.
                let candidate = if spec.local().is_empty() {
                    candidate.public()
                } else {
                    candidate.clone()
                };
                match self.op {
                    Operator::Equal => candidate == *spec,
                    Operator::NotEqual => candidate != *spec,
                    Operator::GreaterEqual => candidate >= *spec,
                    Operator::LessEqual => candidate <= *spec,
                    Operator::Greater => {
                        candidate > *spec
                            && !(spec.post().is_none()
                                && candidate.is_postrelease()
                                && candidate.same_release(spec)
                                && candidate.pre() == spec.pre())
                    }
                    Operator::Less => {
                        candidate < *spec
                            && !(!spec.is_prerelease()
                                && candidate.is_prerelease()
                                && candidate.same_release(spec))
                    }
                    Operator::Compatible => {
                        let prefix = &spec.release()[..spec.release().len() - 1];
                        candidate >= *spec && candidate.release_starts_with(spec.epoch(), prefix)
                    }
                    Operator::Arbitrary => false,
                }
            }
        }
    }
}

impl PartialEq for Specifier {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.version == other.version
    }
}

impl Eq for Specifier {}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

/// A comma-separated conjunction of specifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecifierSet {
    specifiers: Vec<Specifier>,
}

impl SpecifierSet {
    pub fn parse(text: &str) -> Result<Self, SpecifierError> {
        let specifiers = text
            .split(',')
            .map(Specifier::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specifiers })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Specifier> {
        self.specifiers.iter()
    }

    pub fn len(&self) -> usize {
        self.specifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// True when every clause admits `candidate`. An empty set admits everything.
    pub fn contains(&self, candidate: &Version) -> bool {
        self.specifiers.iter().all(|s| s.contains(candidate))
    }

    /// Summary of the whole set.
    ///
    /// A pin anywhere in the set wins, then `~=`, then bounds. `None` for an empty set.
    pub fn kind(&self) -> Option<SpecifierKind> {
        let kinds: Vec<SpecifierKind> = self.specifiers.iter().map(Specifier::kind).collect();
        let has = |k: SpecifierKind| kinds.contains(&k);
        [
            SpecifierKind::ExactPin,
            SpecifierKind::WildcardPin,
            SpecifierKind::Arbitrary,
            SpecifierKind::Compatible,
        ]
        .into_iter()
        .find(|k| has(*k))
        .or_else(|| {
            match (
                has(SpecifierKind::LowerBound),
                has(SpecifierKind::UpperBound),
            ) {
                (true, true) => Some(SpecifierKind::Range),
                (true, false) => Some(SpecifierKind::LowerBound),
                (false, true) => Some(SpecifierKind::UpperBound),
                (false, false) => kinds.first().copied(),
            }
        })
    }

    /// Pins to one version or one wildcard prefix.
    pub fn is_pinned(&self) -> bool {
        self.kind().is_some_and(SpecifierKind::is_pin)
    }
}

impl<'a> IntoIterator for &'a SpecifierSet {
    type Item = &'a Specifier;
    type IntoIter = std::slice::Iter<'a, Specifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.specifiers.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{spec}")?;
        }
        Ok(())
    }
}
