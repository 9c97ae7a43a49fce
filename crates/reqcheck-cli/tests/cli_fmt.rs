use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn reqcheck_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("reqcheck").unwrap();
    cmd.env("HOME", home).env_remove("REQCHECK_MANIFEST");
    cmd
}

const UNFORMATTED: &str = "\
--index-url https://pypi.org/simple
# networking
requests >= 2.25
NumPy==1.22.*   # array maths
certifi>=2022.12.7
";

#[test]
fn test_fmt_rewrites_and_sorts() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.txt");
    fs::write(&path, UNFORMATTED).unwrap();

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .arg("fmt")
        .assert()
        .success()
        .stderr(predicate::str::contains("Formatted"));

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "--index-url https://pypi.org/simple\n\
         certifi>=2022.12.7\n\
         NumPy==1.22.*\n\
         # networking\n\
         requests>=2.25\n"
    );

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["fmt", "--check"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unchanged"));
}

#[test]
fn test_fmt_check_does_not_write() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.txt");
    fs::write(&path, UNFORMATTED).unwrap();

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["fmt", "--check"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not formatted"));

    assert_eq!(fs::read_to_string(&path).unwrap(), UNFORMATTED);
}

#[test]
fn test_fmt_no_sort_keeps_order() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.txt");
    fs::write(&path, "zlib-ng == 2.0\nattrs>=21.2.0\n").unwrap();

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["fmt", "--no-sort"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "zlib-ng==2.0\nattrs>=21.2.0\n"
    );
}

#[test]
fn test_fmt_refuses_broken_manifest() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.txt");
    fs::write(&path, "numpy==1.22.*\nprotobuf>=3.*\n").unwrap();

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .arg("fmt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("line 2"));

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "numpy==1.22.*\nprotobuf>=3.*\n"
    );
}
