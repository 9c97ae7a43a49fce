//! Operation: print manifest entries as a table or JSON.

use std::path::Path;

use serde::Serialize;

use reqcheck_core::manifest::Entry;
use reqcheck_core::specifier::SpecifierKind;
use reqcheck_util::errors::ReqError;
use reqcheck_util::progress;

use crate::ops_setup;

/// Output format for `reqcheck list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFormat {
    #[default]
    Table,
    Json,
}

/// One row of `reqcheck list --format json`.
#[derive(Debug, Clone, Serialize)]
pub struct ListedEntry {
    pub name: String,
    pub normalized_name: String,
    pub specifier: String,
    pub kind: SpecifierKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    pub line: usize,
}

impl From<&Entry> for ListedEntry {
    fn from(e: &Entry) -> Self {
        let req = &e.requirement;
        Self {
            name: req.name.clone(),
            normalized_name: req.normalized_name.clone(),
            specifier: req.specifiers.to_string(),
            kind: req.kind(),
            extras: req.extras.clone(),
            marker: req.marker.clone(),
            line: e.line,
        }
    }
}

/// Print every parsed entry in file order. Unparseable lines are skipped
/// with a warning; `reqcheck check` reports them in full.
pub fn list(manifest_path: &Path, format: ListFormat) -> miette::Result<Vec<ListedEntry>> {
    let manifest = ops_setup::load_manifest(manifest_path)?;
    if !manifest.errors.is_empty() {
        progress::status_warn(
            "Skipping",
            &format!("{} unparseable line(s)", manifest.errors.len()),
        );
    }
    let rows: Vec<ListedEntry> = manifest.entries.iter().map(ListedEntry::from).collect();

    match format {
        ListFormat::Table => print!("{}", render_table(&rows)),
        ListFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).map_err(|e| ReqError::Generic {
                message: format!("Failed to serialize entries: {e}"),
            })?;
            println!("{json}");
        }
    }
    Ok(rows)
}

/// Left-aligned columns sized to their widest cell.
pub fn render_table(rows: &[ListedEntry]) -> String {
    let headers = ["NAME", "SPECIFIER", "KIND", "LINE"];
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|r| {
            let name = if r.extras.is_empty() {
                r.name.clone()
            } else {
                format!("{}[{}]", r.name, r.extras.join(","))
            };
            [name, r.specifier.clone(), r.kind.to_string(), r.line.to_string()]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &cells {
        for (w, c) in widths.iter_mut().zip(row) {
            *w = (*w).max(c.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cols: [&str; 4]| {
        let line = format!(
            "{:<w0$}  {:<w1$}  {:<w2$}  {}",
            cols[0],
            cols[1],
            cols[2],
            cols[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        );
        out.push_str(line.trim_end());
        out.push('\n');
    };
    push_row(headers);
    for row in &cells {
        push_row([&row[0], &row[1], &row[2], &row[3]]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqcheck_core::manifest::Manifest;

    #[test]
    fn table_columns_align() {
        let m = Manifest::parse("requirements.txt", "numpy==1.22.*\ncertifi>=2022.12.7\n");
        let rows: Vec<ListedEntry> = m.entries.iter().map(ListedEntry::from).collect();
        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME     SPECIFIER    KIND"));
        assert!(lines[1].starts_with("numpy    ==1.22.*     wildcard-pin"));
        assert!(lines[2].starts_with("certifi  >=2022.12.7  lower-bound"));
    }
}
