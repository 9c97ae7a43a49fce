use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Unified error type for all reqcheck operations.
#[derive(Debug, Error, Diagnostic)]
pub enum ReqError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest missing or unreadable as a whole.
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Pass --manifest or set `manifest` in reqcheck.toml"))]
    Manifest { message: String },

    /// A single manifest line failed to parse.
    #[error("Parse error: {message}")]
    #[diagnostic(code(reqcheck::parse))]
    Parse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{label}")]
        span: SourceSpan,
        label: String,
    },

    /// Lock file unreadable, malformed, or out of date.
    #[error("Lockfile error: {message}")]
    #[diagnostic(help("Run `reqcheck lock` to regenerate requirements.lock"))]
    Lockfile { message: String },

    /// Invalid reqcheck.toml.
    #[error("Config error: {message}")]
    Config { message: String },

    /// Lint finished with error-level findings.
    #[error("{count} error(s) found in {manifest}")]
    Lint { count: usize, manifest: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

impl ReqError {
    /// Build a [`ReqError::Parse`] pointing at `span` inside `source`.
    pub fn parse(
        name: &str,
        source: &str,
        span: (usize, usize),
        message: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self::Parse {
            message: message.into(),
            src: NamedSource::new(name, source.to_string()),
            span: span.into(),
            label: label.into(),
        }
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type ReqResult<T> = miette::Result<T>;
