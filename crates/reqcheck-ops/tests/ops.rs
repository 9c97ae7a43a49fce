use std::fs;
use std::path::PathBuf;

use reqcheck_ops::ops_check::{self, CheckFormat, CheckOptions};
use reqcheck_ops::ops_fmt::{self, FmtOutcome};
use reqcheck_ops::ops_list::{self, ListFormat};
use reqcheck_ops::{ops_lock, ops_satisfies};
use tempfile::TempDir;

fn project(contents: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.txt");
    fs::write(&path, contents).unwrap();
    (tmp, path)
}

#[test]
fn check_passes_on_valid_manifest() {
    let (_tmp, path) = project("numpy==1.22.*\ncertifi>=2022.12.7\n");
    let report = ops_check::check(&path, &CheckOptions::default()).unwrap();
    assert!(!report.has_errors());
    assert_eq!(report.counts().infos, 1);
}

#[test]
fn check_fails_on_duplicates() {
    let (_tmp, path) = project("numpy==1.22.*\nNumPy>=1.20\n");
    let err = ops_check::check(&path, &CheckOptions::default()).unwrap_err();
    assert!(err.to_string().contains("1 error(s) found"), "got: {err}");
}

#[test]
fn check_respects_project_config() {
    let (tmp, path) = project("certifi>=2022.12.7\n");
    fs::write(
        tmp.path().join("reqcheck.toml"),
        "[lint]\ndeny = [\"unpinned\"]\n",
    )
    .unwrap();
    let opts = CheckOptions {
        format: CheckFormat::Json,
        locked: false,
    };
    assert!(ops_check::check(&path, &opts).is_err());
}

#[test]
fn locked_check_detects_stale_lock() {
    let (_tmp, path) = project("numpy==1.22.*\n");
    let opts = CheckOptions {
        locked: true,
        ..CheckOptions::default()
    };

    let err = ops_check::check(&path, &opts).unwrap_err();
    assert!(err.to_string().contains("not found"), "got: {err}");

    let lock_path = ops_lock::lock(&path).unwrap();
    assert!(lock_path.ends_with("requirements.lock"));
    ops_check::check(&path, &opts).unwrap();

    // Reordering and comments do not invalidate the lock.
    fs::write(&path, "# pinned for the SDK\nnumpy==1.22.*\n").unwrap();
    ops_check::check(&path, &opts).unwrap();

    fs::write(&path, "numpy==1.22.*\ntqdm>=4.64.0\n").unwrap();
    let err = ops_check::check(&path, &opts).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("out of date"), "got: {msg}");
    assert!(msg.contains("added: tqdm"), "got: {msg}");
}

#[test]
fn lock_refuses_duplicates_and_parse_errors() {
    let (_tmp, path) = project("numpy==1.22.*\nnumpy==1.23.*\n");
    let err = ops_lock::lock(&path).unwrap_err();
    assert!(err.to_string().contains("duplicate entries for numpy"), "got: {err}");

    fs::write(&path, "numpy\n").unwrap();
    assert!(ops_lock::lock(&path).is_err());
}

#[test]
fn fmt_sorts_then_is_idempotent() {
    let (_tmp, path) = project("requests>=2.25\nnumpy == 1.22.*\n");
    assert!(ops_fmt::fmt(&path, true, true).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "requests>=2.25\nnumpy == 1.22.*\n");

    assert_eq!(ops_fmt::fmt(&path, true, false).unwrap(), FmtOutcome::Formatted);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "numpy==1.22.*\nrequests>=2.25\n"
    );
    assert_eq!(ops_fmt::fmt(&path, true, false).unwrap(), FmtOutcome::Unchanged);
    assert_eq!(ops_fmt::fmt(&path, true, true).unwrap(), FmtOutcome::Unchanged);
}

#[test]
fn fmt_without_sort_keeps_order() {
    let (_tmp, path) = project("requests >=2.25\nnumpy==1.22.*\n");
    ops_fmt::fmt(&path, false, false).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "requests>=2.25\nnumpy==1.22.*\n"
    );
}

#[test]
fn fmt_leaves_broken_manifest_alone() {
    let (_tmp, path) = project("zlib==1.0\nrequests\n");
    assert!(ops_fmt::fmt(&path, true, false).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "zlib==1.0\nrequests\n");
}

#[test]
fn list_returns_entries_in_file_order() {
    let (_tmp, path) = project("opencv-python==4.6.*\ncertifi>=2022.12.7\nbroken\n");
    let rows = ops_list::list(&path, ListFormat::Json).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["opencv-python", "certifi"]);
    assert_eq!(rows[0].specifier, "==4.6.*");
}

#[test]
fn satisfies_checks_constraints() {
    let (_tmp, path) = project("numpy==1.22.*\ncertifi>=2022.12.7\nopencv_python==4.6.*\n");
    ops_satisfies::satisfies(&path, "numpy", "1.22.4").unwrap();
    ops_satisfies::satisfies(&path, "certifi", "2023.7.22").unwrap();
    ops_satisfies::satisfies(&path, "OpenCV-Python", "4.6.0.66").unwrap();

    let err = ops_satisfies::satisfies(&path, "numpy", "1.23.0").unwrap_err();
    assert!(err.to_string().contains("does not satisfy"), "got: {err}");

    let err = ops_satisfies::satisfies(&path, "pillow", "9.4.0").unwrap_err();
    assert!(err.to_string().contains("not listed"), "got: {err}");

    let err = ops_satisfies::satisfies(&path, "numpy", "one.two").unwrap_err();
    assert!(err.to_string().contains("Invalid version"), "got: {err}");
}

#[cfg(unix)]
#[test]
fn fmt_keeps_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let (_tmp, path) = project("requests>=2.25\nnumpy==1.22.*\n");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    assert_eq!(ops_fmt::fmt(&path, true, false).unwrap(), FmtOutcome::Formatted);
    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}

#[test]
fn byte_order_mark_does_not_block_lock() {
    let (_tmp, path) = project("\u{feff}numpy==1.22.*\nrequests>=2.0\n");
    ops_check::check(&path, &CheckOptions::default()).unwrap();
    let lock_path = ops_lock::lock(&path).unwrap();
    let lock = fs::read_to_string(lock_path).unwrap();
    assert!(lock.contains("name = \"numpy\""));
}
