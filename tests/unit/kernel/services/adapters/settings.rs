use super::*;
use crate::kernel::services::ports::settings::{ReadMode, SearchSettings};

#[test]
fn test_write_default_settings_creates_file_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SETTINGS_DIR).join(SETTINGS_FILE);

    write_default_settings(&path).unwrap();
    let loaded = load_settings_from(&path).unwrap();
    assert_eq!(loaded.search, SearchSettings::default());

    std::fs::write(&path, r#"{"search":{"max_results":7}}"#).unwrap();
    write_default_settings(&path).unwrap();
    assert_eq!(load_settings_from(&path).unwrap().search.max_results, 7);
}

#[test]
fn test_partial_settings_fill_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"search":{"debounce_ms":0,"include_hidden":true,"read_mode":"buffered"}}"#,
    )
    .unwrap();

    let search = load_settings_from(&path).unwrap().search;
    assert_eq!(search.debounce_ms, 0);
    assert!(search.include_hidden);
    assert_eq!(search.read_mode, ReadMode::Buffered);
    assert_eq!(search.max_results, 5000);
    assert_eq!(search.rg_path, "rg");
}

#[test]
fn test_empty_object_is_all_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{}").unwrap();

    let search = load_settings_from(&path).unwrap().search;
    assert_eq!(search, SearchSettings::default());
    assert_eq!(search.debounce(), std::time::Duration::from_millis(50));
    assert_eq!(search.read_mode, ReadMode::Auto);
}

#[test]
fn test_invalid_or_missing_settings_return_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    assert!(load_settings_from(&path).is_none());

    std::fs::write(&path, "{ not json").unwrap();
    assert!(load_settings_from(&path).is_none());

    std::fs::write(&path, r#"{"search":{"read_mode":"sometimes"}}"#).unwrap();
    assert!(load_settings_from(&path).is_none());
}

#[test]
fn test_settings_path_shape() {
    let Some(path) = get_settings_path() else {
        return;
    };
    assert!(path.ends_with(format!("{SETTINGS_DIR}/{SETTINGS_FILE}")));
}
