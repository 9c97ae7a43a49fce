use std::collections::BTreeMap;
use std::path::Path;

use reqcheck_util::errors::{ReqError, ReqResult};

use crate::requirement::{normalize_name, Requirement, RequirementError};

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// The parsed representation of a requirements manifest.
///
/// Parsing never fails as a whole: lines that do not parse are collected in
/// [`Manifest::errors`] next to the entries that did.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Display name, usually the path the manifest was read from.
    pub name: String,
    pub source: String,
    pub entries: Vec<Entry>,
    pub directives: Vec<Directive>,
    pub errors: Vec<ParseError>,
    /// Full-line comments after the last entry or directive.
    pub trailing_comments: Vec<String>,
}

/// One requirement line.
#[derive(Debug, Clone)]
pub struct Entry {
    /// 1-based line number of the first physical line.
    pub line: usize,
    /// 1-based column where the requirement starts.
    pub column: usize,
    /// Byte offset and length within [`Manifest::source`].
    pub span: (usize, usize),
    pub requirement: Requirement,
    /// Per-requirement installer options such as `--hash=sha256:...`.
    pub options: Vec<String>,
    /// Full-line comments directly above this entry.
    pub comments: Vec<String>,
}

/// An installer option line such as `-r base.txt` or `--index-url ...`.
#[derive(Debug, Clone)]
pub struct Directive {
    pub line: usize,
    pub text: String,
    pub comments: Vec<String>,
}

/// A line that looked like a requirement but did not parse.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub span: (usize, usize),
    pub text: String,
    pub error: RequirementError,
}

/// Knobs for [`Manifest::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Order entries by normalized name.
    pub sort: bool,
    /// Keep full-line comments.
    pub comments: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sort: true,
            comments: true,
        }
    }
}

struct Logical {
    line: usize,
    start: usize,
    end: usize,
    text: String,
}

impl Manifest {
    /// Parse manifest text. `name` is used in diagnostics.
    ///
    /// A leading byte-order mark is dropped; spans index the text without it.
    pub fn parse(name: &str, source: &str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let mut manifest = Manifest {
            name: name.to_string(),
            source: source.to_string(),
            entries: Vec::new(),
            directives: Vec::new(),
            errors: Vec::new(),
            trailing_comments: Vec::new(),
        };

        let mut comments: Vec<String> = Vec::new();
        let mut pending: Option<Logical> = None;
        let mut offset = 0;

        for (idx, raw) in source.split_inclusive('\n').enumerate() {
            let line_start = offset;
            offset += raw.len();
            let content = raw.trim_end_matches(['\n', '\r']);

            if pending.is_none() {
                let trimmed = content.trim_start();
                if let Some(comment) = trimmed.strip_prefix('#') {
                    comments.push(comment.trim().to_string());
                    continue;
                }
            }

            let code = strip_inline_comment(content);
            let (piece, continues) = match code.trim_end().strip_suffix('\\') {
                Some(p) => (p, true),
                None => (code, false),
            };

            let logical = pending.get_or_insert_with(|| Logical {
                line: idx + 1,
                start: line_start,
                end: line_start,
                text: String::new(),
            });
            if !logical.text.is_empty() {
                logical.text.push(' ');
            }
            logical.text.push_str(piece.trim());
            if !piece.trim().is_empty() {
                logical.end = line_start + piece.trim_end().len();
            }

            if !continues {
                if let Some(done) = pending.take() {
                    manifest.push_logical(done, &mut comments);
                }
            }
        }
        if let Some(done) = pending.take() {
            manifest.push_logical(done, &mut comments);
        }
        manifest.trailing_comments = comments;

        tracing::debug!(
            manifest = %manifest.name,
            entries = manifest.entries.len(),
            errors = manifest.errors.len(),
            "parsed manifest"
        );
        manifest
    }

    /// Load and parse a manifest from disk.
    pub fn from_path(path: &Path) -> ReqResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReqError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Ok(Self::parse(&path.display().to_string(), &content))
    }

    fn push_logical(&mut self, logical: Logical, comments: &mut Vec<String>) {
        let text = logical.text.trim();
        if text.is_empty() {
            return;
        }
        let first_line = &self.source[logical.start..];
        let lead = first_line.len() - first_line.trim_start_matches([' ', '\t']).len();
        let start = logical.start + lead;
        let len = logical.end.saturating_sub(start).max(1);
        let column = lead + 1;

        if text.starts_with('-') {
            self.directives.push(Directive {
                line: logical.line,
                text: text.to_string(),
                comments: std::mem::take(comments),
            });
            return;
        }

        let (req_text, options) = split_options(text);
        match Requirement::parse(req_text) {
            Ok(requirement) => self.entries.push(Entry {
                line: logical.line,
                column,
                span: (start, len),
                requirement,
                options,
                comments: std::mem::take(comments),
            }),
            Err(error) => {
                tracing::debug!(line = logical.line, %error, "unparseable requirement");
                comments.clear();
                self.errors.push(ParseError {
                    line: logical.line,
                    column,
                    span: (start, len),
                    text: text.to_string(),
                    error,
                });
            }
        }
    }

    /// Look up an entry by package name; separators and case are ignored.
    pub fn find(&self, name: &str) -> Option<&Entry> {
        let wanted = normalize_name(name);
        self.entries
            .iter()
            .find(|e| e.requirement.normalized_name == wanted)
    }

    /// Groups of entries sharing a normalized name, ordered by first occurrence.
    pub fn duplicates(&self) -> Vec<Vec<&Entry>> {
        let mut groups: BTreeMap<&str, Vec<&Entry>> = BTreeMap::new();
        for entry in &self.entries {
            groups
                .entry(entry.requirement.normalized_name.as_str())
                .or_default()
                .push(entry);
        }
        let mut dups: Vec<Vec<&Entry>> = groups.into_values().filter(|g| g.len() > 1).collect();
        dups.sort_by_key(|g| g[0].line);
        dups
    }

    /// True when entries appear in normalized-name order.
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| {
            w[0].requirement.normalized_name <= w[1].requirement.normalized_name
        })
    }

    /// True when there are no parse errors and no duplicate names.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.duplicates().is_empty()
    }

    pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.entries.iter().map(|e| &e.requirement)
    }

    /// Canonical text: directives first, then one requirement per line.
    pub fn render(&self, opts: RenderOptions) -> String {
        let mut out = String::new();
        let push_comments = |out: &mut String, comments: &[String]| {
            if opts.comments {
                for c in comments {
                    if c.is_empty() {
                        out.push_str("#\n");
                    } else {
                        out.push_str(&format!("# {c}\n"));
                    }
                }
            }
        };

        for d in &self.directives {
            push_comments(&mut out, &d.comments);
            out.push_str(&d.text);
            out.push('\n');
        }

        let mut entries: Vec<&Entry> = self.entries.iter().collect();
        if opts.sort {
            entries.sort_by(|a, b| {
                a.requirement
                    .normalized_name
                    .cmp(&b.requirement.normalized_name)
            });
        }
        for e in entries {
            push_comments(&mut out, &e.comments);
            out.push_str(&e.requirement.to_string());
            for opt in &e.options {
                out.push(' ');
                out.push_str(opt);
            }
            out.push('\n');
        }
        push_comments(&mut out, &self.trailing_comments);
        out
    }

    /// Build a source-annotated diagnostic for one parse error.
    pub fn report(&self, err: &ParseError) -> ReqError {
        ReqError::parse(
            &self.name,
            &self.source,
            err.span,
            format!("line {}: {}", err.line, err.error),
            "not a valid `<name><op><version>` requirement",
        )
    }

    /// Fail with the first parse error, if any.
    pub fn ensure_parsed(&self) -> ReqResult<()> {
        match self.errors.first() {
            Some(err) => Err(self.report(err).into()),
            None => Ok(()),
        }
    }
}

/// Cut a ` # comment` off the end of a line. `#` glued to text is kept.
fn strip_inline_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}

/// Split `numpy==1.22.* --hash=sha256:abc` into the requirement and its options.
fn split_options(text: &str) -> (&str, Vec<String>) {
    match text.find(" --") {
        Some(i) => (
            text[..i].trim_end(),
            text[i..].split_whitespace().map(str::to_string).collect(),
        ),
        None => (text, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_inline_comments_only_after_whitespace() {
        assert_eq!(strip_inline_comment("numpy==1.0 # pinned"), "numpy==1.0 ");
        assert_eq!(strip_inline_comment("pkg==1.0#frag"), "pkg==1.0#frag");
        assert_eq!(strip_inline_comment("# all comment"), "");
    }

    #[test]
    fn splits_hash_options() {
        let (req, opts) = split_options("numpy==1.22.4 --hash=sha256:abc --hash=sha256:def");
        assert_eq!(req, "numpy==1.22.4");
        assert_eq!(opts, vec!["--hash=sha256:abc", "--hash=sha256:def"]);
    }

    #[test]
    fn span_points_at_requirement_text() {
        let src = "numpy==1.22.*\n  requests\n";
        let m = Manifest::parse("requirements.txt", src);
        assert_eq!(m.errors.len(), 1);
        let err = &m.errors[0];
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 3);
        assert_eq!(&src[err.span.0..err.span.0 + err.span.1], "requests");
    }
}
