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

#[test]
fn test_lock_writes_lockfile() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("requirements.txt"),
        "numpy==1.22.*\ncertifi>=2022.12.7\n",
    )
    .unwrap();

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .arg("lock")
        .assert()
        .success()
        .stderr(predicate::str::contains("Locked"))
        .stderr(predicate::str::contains("2 package(s)"));

    let lock = fs::read_to_string(tmp.path().join("requirements.lock")).unwrap();
    assert!(lock.contains("version = 1"));
    assert!(lock.contains("manifest = \"requirements.txt\""));
    assert!(lock.contains("name = \"numpy\""));
    assert!(lock.contains("specifier = \"==1.22.*\""));
    assert!(lock.contains("kind = \"wildcard-pin\""));
    assert!(lock.contains("kind = \"lower-bound\""));
    // certifi sorts before numpy
    assert!(lock.find("certifi").unwrap() < lock.find("numpy").unwrap());
}

#[test]
fn test_lock_from_subdirectory() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("requirements.txt"), "tqdm>=4.64.0\n").unwrap();
    let nested = tmp.path().join("pkg/module");
    fs::create_dir_all(&nested).unwrap();

    reqcheck_cmd(tmp.path())
        .current_dir(&nested)
        .arg("lock")
        .assert()
        .success();

    assert!(tmp.path().join("requirements.lock").is_file());
    assert!(!nested.join("requirements.lock").exists());
}

#[test]
fn test_lock_rejects_duplicates() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("requirements.txt"),
        "opencv_python==4.6.0.66\nopencv-python==4.7.*\n",
    )
    .unwrap();

    reqcheck_cmd(tmp.path())
        .current_dir(tmp.path())
        .arg("lock")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("duplicate entries for opencv-python"));

    assert!(!tmp.path().join("requirements.lock").exists());
}
