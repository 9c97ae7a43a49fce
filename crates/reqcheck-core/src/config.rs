use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use reqcheck_util::errors::ReqError;
use reqcheck_util::fs::find_ancestor_with;

/// Project configuration file name.
pub const CONFIG_FILE: &str = "reqcheck.toml";

/// Resolved configuration: global `~/.reqcheck/config.toml` with the
/// nearest project `reqcheck.toml` layered on top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Manifest path, relative to the directory of the file that set it.
    pub manifest: Option<PathBuf>,
    pub lint: LintConfig,
    /// Files that contributed, lowest precedence first.
    pub sources: Vec<PathBuf>,
}

/// Lint settings from `[lint]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintConfig {
    /// Report lower-bound-only constraints as warnings instead of info.
    pub require_pins: bool,
    pub allow_wildcards: bool,
    pub require_sorted: bool,
    /// Rule ids promoted to errors.
    pub deny: Vec<String>,
    /// Rule ids silenced.
    pub allow: Vec<String>,
    /// Glob patterns over normalized package names to skip.
    pub ignore: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            require_pins: false,
            allow_wildcards: true,
            require_sorted: false,
            deny: Vec::new(),
            allow: Vec::new(),
            ignore: Vec::new(),
        }
    }
}

/// On-disk shape of a config file. Every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub manifest: Option<String>,
    #[serde(default)]
    pub lint: LintFile,
}

/// `[lint]` table as written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintFile {
    #[serde(default, rename = "require-pins")]
    pub require_pins: Option<bool>,
    #[serde(default, rename = "allow-wildcards")]
    pub allow_wildcards: Option<bool>,
    #[serde(default, rename = "require-sorted")]
    pub require_sorted: Option<bool>,
    #[serde(default)]
    pub deny: Option<Vec<String>>,
    #[serde(default)]
    pub allow: Option<Vec<String>>,
    #[serde(default)]
    pub ignore: Option<Vec<String>>,
}

impl ConfigFile {
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReqError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| {
            ReqError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }
}

impl Config {
    /// Load the global config, then the nearest `reqcheck.toml` at or above `start`.
    pub fn load(start: &Path) -> miette::Result<Self> {
        let global = Self::default_path();
        let project = find_ancestor_with(start, CONFIG_FILE).map(|dir| dir.join(CONFIG_FILE));
        let mut layers = Vec::new();
        if global.is_file() {
            layers.push(global);
        }
        if let Some(p) = project {
            if !layers.contains(&p) {
                layers.push(p);
            }
        }
        Self::load_layers(&layers)
    }

    /// Merge the given files in order; later files win field by field.
    pub fn load_layers(paths: &[PathBuf]) -> miette::Result<Self> {
        let mut config = Config::default();
        for path in paths {
            let file = ConfigFile::from_path(path)?;
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.apply(file, base);
            config.sources.push(path.clone());
            tracing::debug!(path = %path.display(), "loaded config layer");
        }
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile, base: &Path) {
        if let Some(m) = file.manifest {
            self.manifest = Some(base.join(m));
        }
        let lint = file.lint;
        if let Some(v) = lint.require_pins {
            self.lint.require_pins = v;
        }
        if let Some(v) = lint.allow_wildcards {
            self.lint.allow_wildcards = v;
        }
        if let Some(v) = lint.require_sorted {
            self.lint.require_sorted = v;
        }
        if let Some(v) = lint.deny {
            self.lint.deny = v;
        }
        if let Some(v) = lint.allow {
            self.lint.allow = v;
        }
        if let Some(v) = lint.ignore {
            self.lint.ignore = v;
        }
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the reqcheck data directory (`~/.reqcheck/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".reqcheck")
}
