use reqcheck_util::fs::{find_ancestor_with, write_atomic};
use tempfile::TempDir;

#[test]
fn test_find_ancestor_with_direct() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("reqcheck.toml"), "").unwrap();
    let result = find_ancestor_with(tmp.path(), "reqcheck.toml");
    assert_eq!(result, Some(tmp.path().to_path_buf()));
}

#[test]
fn test_find_ancestor_with_nested() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("reqcheck.toml"), "").unwrap();
    let nested = tmp.path().join("a").join("b").join("c");
    std::fs::create_dir_all(&nested).unwrap();
    let result = find_ancestor_with(&nested, "reqcheck.toml");
    assert_eq!(result, Some(tmp.path().to_path_buf()));
}

#[test]
fn test_find_ancestor_with_not_found() {
    let tmp = TempDir::new().unwrap();
    let result = find_ancestor_with(tmp.path(), "NonExistent.file");
    assert_eq!(result, None);
}

#[test]
fn test_find_ancestor_ignores_directories() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("requirements.txt")).unwrap();
    assert_eq!(find_ancestor_with(tmp.path(), "requirements.txt"), None);
}

#[test]
fn test_write_atomic_creates_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.lock");
    write_atomic(&path, "version = 1\n").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "version = 1\n");
}

#[test]
fn test_write_atomic_replaces_existing() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.txt");
    std::fs::write(&path, "old\n").unwrap();
    write_atomic(&path, "numpy==1.22.*\n").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "numpy==1.22.*\n");
    let leftovers = std::fs::read_dir(tmp.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[cfg(unix)]
#[test]
fn test_write_atomic_keeps_existing_mode() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.txt");
    std::fs::write(&path, "requests>=2.25\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o664)).unwrap();

    write_atomic(&path, "numpy==1.22.*\n").unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o664);
}

#[cfg(unix)]
#[test]
fn test_write_atomic_new_file_is_world_readable() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("requirements.lock");
    write_atomic(&path, "version = 1\n").unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}
