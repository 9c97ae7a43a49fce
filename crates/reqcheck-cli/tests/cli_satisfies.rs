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

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("requirements.txt"),
        "numpy==1.22.*\ncertifi>=2022.12.7\nprotobuf==3.20.*\n",
    )
    .unwrap();
    tmp
}

#[test]
fn test_satisfies_match() {
    let tmp = project();

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["satisfies", "numpy", "1.22.4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("numpy 1.22.4 satisfies ==1.22.*"));
}

#[test]
fn test_satisfies_mismatch() {
    let tmp = project();

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["satisfies", "protobuf", "4.21.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not satisfy"));
}

#[test]
fn test_satisfies_lower_bound() {
    let tmp = project();

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["satisfies", "certifi", "2022.12.7"])
        .assert()
        .success();

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["satisfies", "certifi", "2022.9.24"])
        .assert()
        .code(1);
}

#[test]
fn test_satisfies_unknown_package() {
    let tmp = project();

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["satisfies", "pillow", "9.4.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not listed"));
}
