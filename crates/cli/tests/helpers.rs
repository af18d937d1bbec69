use std::fs;
use std::path::Path;

use orphan_sweep::{canonicalize_or_current, infer_workspace_name, sha256_file};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");
    assert_eq!(result, expected);

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn canonicalize_or_current_joins_missing_path_with_cwd() {
    let result = canonicalize_or_current("does-not-exist-yet").expect("canonicalize");
    assert!(result.is_absolute());
    assert!(result.ends_with("does-not-exist-yet"));
}

#[test]
fn infer_workspace_name_uses_last_path_component() {
    assert_eq!(infer_workspace_name(Path::new("/srv/audits/prod-sweep")), "prod-sweep");
}

#[test]
fn infer_workspace_name_falls_back_when_missing() {
    assert_eq!(infer_workspace_name(Path::new("/")), "unnamed-workspace");
}

#[test]
fn sha256_file_matches_known_hash() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("abc.txt");
    fs::write(&path, b"abc").unwrap();

    let expected = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    assert_eq!(sha256_file(&path).unwrap(), expected);
}

#[test]
fn sha256_file_reports_missing_file() {
    let tmp = tempdir().unwrap();
    let err = sha256_file(&tmp.path().join("nope.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to open snapshot for hashing"));
}
