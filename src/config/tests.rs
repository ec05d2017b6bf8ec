use super::*;
use tempfile::TempDir;

fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("slack").join("config.json")
}

#[test]
fn load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = LabelStore::load(store_path(&dir));
    assert!(store.labels().is_empty());
}

#[test]
fn load_corrupt_json_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let store = LabelStore::load(&path);
    assert!(store.labels().is_empty());
}

#[test]
fn load_non_object_document_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    assert!(LabelStore::load(&path).labels().is_empty());
}

#[test]
fn load_null_document_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "null").unwrap();

    assert!(LabelStore::load(&path).labels().is_empty());
}

#[test]
fn load_reads_labels() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"user_labels": {"mom": "U999", "boss": "boss@example.com"}}"#,
    )
    .unwrap();

    let store = LabelStore::load(&path);
    assert_eq!(store.get("mom"), Some("U999"));
    assert_eq!(store.get("boss"), Some("boss@example.com"));
    assert_eq!(store.get("nobody"), None);
}

#[test]
fn load_drops_non_string_and_blank_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"user_labels": {"a": 1, "b": "   ", "c": null, "d": "  U1  "}}"#,
    )
    .unwrap();

    let store = LabelStore::load(&path);
    assert_eq!(store.labels().len(), 1);
    assert_eq!(store.get("d"), Some("U1"));
}

#[test]
fn load_ignores_non_object_labels() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"user_labels": ["mom"]}"#).unwrap();

    assert!(LabelStore::load(&path).labels().is_empty());
}

#[test]
fn add_label_trims_input() {
    let dir = TempDir::new().unwrap();
    let mut store = LabelStore::load(store_path(&dir));

    store.add_label("  mom ", " U999 ").unwrap();
    assert_eq!(store.get("mom"), Some("U999"));
}

#[test]
fn add_label_rejects_empty_label() {
    let dir = TempDir::new().unwrap();
    let mut store = LabelStore::load(store_path(&dir));

    let err = store.add_label("   ", "U999").unwrap_err();
    assert!(matches!(err, ConfigError::EmptyLabel));
}

#[test]
fn add_label_rejects_empty_value() {
    let dir = TempDir::new().unwrap();
    let mut store = LabelStore::load(store_path(&dir));

    let err = store.add_label("mom", "").unwrap_err();
    assert!(matches!(err, ConfigError::EmptyValue));
}

#[test]
fn add_label_overwrites_existing() {
    let dir = TempDir::new().unwrap();
    let mut store = LabelStore::load(store_path(&dir));

    store.add_label("mom", "U1").unwrap();
    store.add_label("mom", "U2").unwrap();
    assert_eq!(store.get("mom"), Some("U2"));
    assert_eq!(store.labels().len(), 1);
}

#[test]
fn save_creates_parent_dirs_and_writes_labels() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut store = LabelStore::load(&path);

    store.add_label("mom", "U999").unwrap();
    store.save().unwrap();

    let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["user_labels"]["mom"], "U999");
}

#[test]
fn save_then_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);

    let mut store = LabelStore::load(&path);
    store.add_label("mom", "U999").unwrap();
    store.add_label("boss", "boss@example.com").unwrap();
    store.save().unwrap();

    let reloaded = LabelStore::load(&path);
    assert_eq!(reloaded.labels(), store.labels());
}

#[test]
fn save_preserves_other_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"theme": "dark", "user_labels": {}}"#).unwrap();

    let mut store = LabelStore::load(&path);
    store.add_label("mom", "U999").unwrap();
    store.save().unwrap();

    let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["theme"], "dark");
    assert_eq!(raw["user_labels"]["mom"], "U999");
}

#[test]
fn save_writes_sorted_keys_and_trailing_newline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let mut store = LabelStore::load(&path);
    store.add_label("zed", "U2").unwrap();
    store.add_label("amy", "U1").unwrap();
    store.save().unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.ends_with("}\n"));
    let amy = contents.find("amy").unwrap();
    let zed = contents.find("zed").unwrap();
    assert!(amy < zed);
}

#[test]
fn save_replaces_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "garbage").unwrap();

    let mut store = LabelStore::load(&path);
    store.add_label("mom", "U999").unwrap();
    store.save().unwrap();

    assert_eq!(LabelStore::load(&path).get("mom"), Some("U999"));
}

#[test]
fn config_path_uses_override() {
    let path = config_path(Some("/tmp/custom.json")).unwrap();
    assert_eq!(path, PathBuf::from("/tmp/custom.json"));
}

#[test]
fn config_path_expands_tilde_override() {
    let home = dirs::home_dir().unwrap();
    let path = config_path(Some("~/labels.json")).unwrap();
    assert_eq!(path, home.join("labels.json"));
}

#[test]
fn config_path_default_ends_with_app_file() {
    let path = config_path(None).unwrap();
    assert!(path.ends_with("slack/config.json"));
}
