use super::*;

#[test]
fn test_no_roots_is_config_error() {
    let err = resolve_search_root(&[]).unwrap_err();
    assert!(matches!(err, ConfigError::NoWorkspaceRoot));
    assert_eq!(err.to_string(), "No workspace folder is open");
}

#[test]
fn test_first_root_wins() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let root =
        resolve_search_root(&[a.path().to_path_buf(), b.path().to_path_buf()]).unwrap();
    assert_eq!(root, a.path().canonicalize().unwrap());
    assert!(root.is_absolute());
}

#[test]
fn test_missing_root_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    match resolve_search_root(&[missing.clone()]) {
        Err(ConfigError::InvalidRoot { path, .. }) => assert_eq!(path, missing),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_file_root_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.txt");
    std::fs::write(&file, "x").unwrap();
    assert!(matches!(
        resolve_search_root(&[file]),
        Err(ConfigError::InvalidRoot { .. })
    ));
}

#[test]
fn test_roots_from_args() {
    let cwd = Path::new("/home/me");
    assert_eq!(roots_from_args(cwd, &[]), vec![PathBuf::from("/home/me")]);
    assert_eq!(
        roots_from_args(cwd, &["proj".to_string(), "/abs".to_string()]),
        vec![PathBuf::from("/home/me/proj"), PathBuf::from("/abs")]
    );
}
