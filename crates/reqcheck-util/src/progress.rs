//! Cargo-style status lines on stderr.
//!
//! Every line has the shape `{label:>12} {message}` with a coloured label, so
//! output from `check`, `fmt` and `lock` lines up in one column.

use std::io::Write;

use console::Style;

/// Label colour for a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Bold green: an action was performed.
    Action,
    /// Bold cyan: informational.
    Info,
    /// Bold yellow.
    Warn,
    /// Bold red.
    Error,
}

impl Tone {
    fn style(self) -> Style {
        let base = Style::new().bold();
        match self {
            Tone::Action => base.green(),
            Tone::Info => base.cyan(),
            Tone::Warn => base.yellow(),
            Tone::Error => base.red(),
        }
    }
}

/// Render a status line. `label` may be a styled value; padding applies to
/// its visible text.
pub fn format_line(label: impl std::fmt::Display, message: &str) -> String {
    format!("{label:>12} {message}")
}

fn emit(tone: Tone, label: &str, message: &str) {
    let _ = writeln!(
        std::io::stderr(),
        "{}",
        format_line(tone.style().apply_to(label), message)
    );
}

/// Print an action line: `    Checking requirements.txt`
pub fn status(label: &str, message: &str) {
    emit(Tone::Action, label, message);
}

/// Like [`status`] but for informational (non-action) messages.
pub fn status_info(label: &str, message: &str) {
    emit(Tone::Info, label, message);
}

pub fn status_warn(label: &str, message: &str) {
    emit(Tone::Warn, label, message);
}

pub fn status_error(label: &str, message: &str) {
    emit(Tone::Error, label, message);
}
