//! Release version parsing and ordering.
//!
//! The accepted grammar is
//!
//! ```text
//! [N!]N(.N)*[{a|b|rc}N][.postN][.devN][+local]
//! ```
//!
//! Ordering within one release:
//! - a dev-only release sorts before every pre-release of it
//! - pre-releases order `a` < `b` < `rc`, then by number
//! - the final release sorts after its pre-releases and before its post-releases
//! - a `.devN` suffix sorts before the same version without it
//! - a local label sorts after the same public version without one
//!
//! Trailing zero release segments do not affect ordering: `1.0 == 1.0.0`.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// Why a version string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("version is empty")]
    Empty,
    #[error("version `{0}` has no numeric release segment")]
    MissingRelease(String),
    #[error("invalid epoch in `{0}`")]
    InvalidEpoch(String),
    #[error("number too large in `{0}`")]
    Overflow(String),
    #[error("invalid local label in `{0}`")]
    InvalidLocal(String),
    #[error("unexpected `{rest}` in version `{input}`")]
    Trailing { input: String, rest: String },
}

/// Pre-release phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreKind {
    Alpha,
    Beta,
    Rc,
}

impl PreKind {
    fn as_str(self) -> &'static str {
        match self {
            PreKind::Alpha => "a",
            PreKind::Beta => "b",
            PreKind::Rc => "rc",
        }
    }
}

/// One dot-separated component of a local label.
///
/// Alphanumeric segments sort before numeric ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocalSegment {
    Text(String),
    Numeric(u64),
}

impl fmt::Display for LocalSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalSegment::Text(s) => f.write_str(s),
            LocalSegment::Numeric(n) => write!(f, "{n}"),
        }
    }
}

/// A parsed, comparable version.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Vec<LocalSegment>,
}

impl Version {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }
        let lowered = trimmed.to_ascii_lowercase();
        let body = lowered.strip_prefix('v').unwrap_or(&lowered);

        let (public, local) = match body.split_once('+') {
            Some((p, l)) => (p, Some(l)),
            None => (body, None),
        };

        let (epoch, rest) = match public.split_once('!') {
            Some((e, r)) => {
                let epoch = e
                    .parse::<u64>()
                    .map_err(|_| VersionError::InvalidEpoch(trimmed.to_string()))?;
                (epoch, r)
            }
            None => (0, public),
        };

        let mut cur = Cursor::new(rest, trimmed);

        let mut release = Vec::new();
        loop {
            match cur.number()? {
                Some(n) => release.push(n),
                None => break,
            }
            if cur.peek() == Some(b'.') && cur.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                cur.bump(1);
            } else {
                break;
            }
        }
        if release.is_empty() {
            return Err(VersionError::MissingRelease(trimmed.to_string()));
        }

        let pre = cur.suffix(PRE_LABELS)?.map(|(label, n)| {
            let kind = match label {
                "a" | "alpha" => PreKind::Alpha,
                "b" | "beta" => PreKind::Beta,
                _ => PreKind::Rc,
            };
            (kind, n)
        });

        let mut post = cur.suffix(POST_LABELS)?.map(|(_, n)| n);
        if post.is_none() && cur.peek() == Some(b'-') {
            // Implicit post release: `1.0-1`.
            let mark = cur.pos;
            cur.bump(1);
            match cur.number()? {
                Some(n) => post = Some(n),
                None => cur.pos = mark,
            }
        }

        let dev = cur.suffix(DEV_LABELS)?.map(|(_, n)| n);

        if !cur.is_done() {
            return Err(VersionError::Trailing {
                input: trimmed.to_string(),
                rest: cur.rest().to_string(),
            });
        }

        let local = match local {
            Some(l) => parse_local(l, trimmed)?,
            None => Vec::new(),
        };

        Ok(Self {
            original: trimmed.to_string(),
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    /// The text this version was parsed from, trimmed.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Numeric release segments, e.g. `[1, 22, 4]` for `1.22.4`.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn pre(&self) -> Option<(PreKind, u64)> {
        self.pre
    }

    pub fn post(&self) -> Option<u64> {
        self.post
    }

    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    pub fn local(&self) -> &[LocalSegment] {
        &self.local
    }

    /// True for `a`/`b`/`rc` and `.dev` versions.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    /// True when the version has only a release part (plus optional epoch).
    pub fn is_plain_release(&self) -> bool {
        self.pre.is_none() && self.post.is_none() && self.dev.is_none() && self.local.is_empty()
    }

    /// A copy of this version with the local label removed.
    pub fn public(&self) -> Version {
        if self.local.is_empty() {
            return self.clone();
        }
        let original = match self.original.split_once('+') {
            Some((p, _)) => p.to_string(),
            None => self.original.clone(),
        };
        Version {
            original,
            local: Vec::new(),
            ..self.clone()
        }
    }

    /// Release segments with trailing zeros removed.
    fn trimmed_release(&self) -> &[u64] {
        let end = self
            .release
            .iter()
            .rposition(|&n| n != 0)
            .map_or(0, |i| i + 1);
        &self.release[..end]
    }

    /// Same epoch and release, ignoring pre/post/dev/local.
    pub fn same_release(&self, other: &Version) -> bool {
        self.epoch == other.epoch && self.trimmed_release() == other.trimmed_release()
    }

    /// True when the first `prefix.len()` release segments (zero-padded) equal `prefix`.
    pub fn release_starts_with(&self, epoch: u64, prefix: &[u64]) -> bool {
        if self.epoch != epoch {
            return false;
        }
        prefix
            .iter()
            .enumerate()
            .all(|(i, &p)| self.release.get(i).copied().unwrap_or(0) == p)
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOnly,
            (Some((kind, n)), _, _) => PreKey::Pre(kind, n),
            _ => PreKey::Final,
        }
    }

    fn dev_key(&self) -> DevKey {
        match self.dev {
            Some(n) => DevKey::Dev(n),
            None => DevKey::Release,
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    DevOnly,
    Pre(PreKind, u64),
    Final,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum DevKey {
    Dev(u64),
    Release,
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.trimmed_release().cmp(other.trimmed_release()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        f.write_str(&release.join("."))?;
        if let Some((kind, n)) = self.pre {
            write!(f, "{}{n}", kind.as_str())?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{n}")?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{n}")?;
        }
        if !self.local.is_empty() {
            let local: Vec<String> = self.local.iter().map(ToString::to_string).collect();
            write!(f, "+{}", local.join("."))?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

// Longest spelling first so `alpha` is not read as `a` + `lpha`.
const PRE_LABELS: &[&str] = &["alpha", "beta", "preview", "pre", "rc", "a", "b", "c"];
const POST_LABELS: &[&str] = &["post", "rev", "r"];
const DEV_LABELS: &[&str] = &["dev"];

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    input: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, input: &'a str) -> Self {
        Self { src, pos: 0, input }
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn bump(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.src.len());
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn is_done(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn number(&mut self) -> Result<Option<u64>, VersionError> {
        let digits = self
            .rest()
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return Ok(None);
        }
        let text = &self.src[self.pos..self.pos + digits];
        let n = text
            .parse::<u64>()
            .map_err(|_| VersionError::Overflow(self.input.to_string()))?;
        self.pos += digits;
        Ok(Some(n))
    }

    /// Try `[sep]label[sep][N]`; on no match the cursor is left untouched.
    fn suffix(
        &mut self,
        labels: &[&'static str],
    ) -> Result<Option<(&'static str, u64)>, VersionError> {
        let mark = self.pos;
        if matches!(self.peek(), Some(b'.' | b'-' | b'_')) {
            self.bump(1);
        }
        let Some(label) = labels.iter().find(|l| self.rest().starts_with(**l)) else {
            self.pos = mark;
            return Ok(None);
        };
        self.bump(label.len());
        let before_sep = self.pos;
        if matches!(self.peek(), Some(b'.' | b'-' | b'_')) {
            self.bump(1);
        }
        match self.number()? {
            Some(n) => Ok(Some((*label, n))),
            None => {
                self.pos = before_sep;
                Ok(Some((*label, 0)))
            }
        }
    }
}

fn parse_local(local: &str, input: &str) -> Result<Vec<LocalSegment>, VersionError> {
    let mut out = Vec::new();
    for part in local.split(['.', '-', '_']) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(VersionError::InvalidLocal(input.to_string()));
        }
        let seg = if part.bytes().all(|b| b.is_ascii_digit()) {
            part.parse::<u64>()
                .map(LocalSegment::Numeric)
                .map_err(|_| VersionError::Overflow(input.to_string()))?
        } else {
            LocalSegment::Text(part.to_string())
        };
        out.push(seg);
    }
    Ok(out)
}
