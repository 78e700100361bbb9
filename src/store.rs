//! Locale file storage: load, save and nested-key edits on JSON documents.
//!
//! Documents are read whole, changed in memory and rewritten whole. Output is
//! pretty-printed with 2-space indentation and a single trailing newline.

use crate::error::StoreError;
use crate::paths::{relative_path, LocaleTarget};
use crate::translations::TranslationSet;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Load a locale document. A missing file is an empty object.
pub fn load(path: &Path) -> Result<Value, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} does not exist, starting from an empty document", path.display());
            return Ok(Value::Object(Map::new()));
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let document: Value =
        serde_json::from_str(&content).map_err(|source| StoreError::MalformedJson {
            path: path.to_path_buf(),
            source,
        })?;

    if !document.is_object() {
        return Err(StoreError::NotAnObject {
            path: path.to_path_buf(),
        });
    }

    Ok(document)
}

/// Write a document, creating missing parent directories.
pub fn save(path: &Path, document: &Value) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    // `{:#}` is serde_json's pretty printer (2-space indent)
    fs::write(path, format!("{:#}\n", document)).map_err(write_err)
}

/// Whether every segment of `key` is present in the file.
///
/// Unlike [`load`], an unreadable or malformed file counts as empty here.
pub fn key_exists(path: &Path, key: &str) -> bool {
    match load(path) {
        Ok(document) => get_nested_value(&document, key).is_some(),
        Err(e) => {
            warn!("Treating {} as empty for existence check: {}", path.display(), e);
            false
        }
    }
}

/// Value stored at a dotted key, if every segment is present.
pub fn get_nested_value<'a>(document: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

/// Assign `value` at a dotted key, creating intermediate objects.
///
/// A non-object value sitting on an intermediate segment is replaced by an
/// empty object. Sibling keys are left alone.
pub fn set_nested_value(document: &mut Value, key: &str, value: impl Into<Value>) {
    let mut segments: Vec<&str> = key.split('.').collect();
    // split always yields at least one item
    let last = segments.pop().unwrap_or(key);

    let mut current = document;
    for segment in segments {
        current = as_object(current)
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    as_object(current).insert(last.to_string(), value.into());
}

fn as_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value
        .as_object_mut()
        .expect("value was just replaced with an object")
}

/// Per-file outcome of [`update_many`].
#[derive(Debug, Default)]
pub struct WriteReport {
    /// Files that now contain the key.
    pub updated: Vec<PathBuf>,
    /// Targets left untouched because their translation was missing or empty.
    pub skipped: Vec<LocaleTarget>,
    /// Files whose load or save failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

impl WriteReport {
    pub fn succeeded(&self) -> usize {
        self.updated.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// "N succeeded, M failed" style one-liner.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} succeeded, {} failed",
            self.updated.len(),
            self.failed.len()
        );
        if !self.skipped.is_empty() {
            let langs: Vec<&str> = self.skipped.iter().map(|t| t.language.as_str()).collect();
            summary.push_str(&format!(", skipped: {}", langs.join(", ")));
        }
        summary
    }

    /// Updated files as project-relative display paths.
    pub fn updated_display(&self, root: Option<&Path>) -> Vec<String> {
        self.updated
            .iter()
            .map(|p| relative_path(root, p).display().to_string())
            .collect()
    }
}

fn write_one(path: &Path, key: &str, text: &str) -> Result<(), StoreError> {
    let mut document = load(path)?;
    set_nested_value(&mut document, key, text);
    save(path, &document)
}

/// Write `key` into every target that has a non-empty translation.
///
/// A failing file is recorded and does not stop the remaining writes.
pub fn update_many(
    targets: &[LocaleTarget],
    key: &str,
    translations: &TranslationSet,
) -> WriteReport {
    let mut report = WriteReport::default();

    for target in targets {
        let text = match translations.get(&target.language) {
            Some(text) if !text.is_empty() => text,
            _ => {
                debug!("No translation for {}, skipping {}", target.language, target.path.display());
                report.skipped.push(target.clone());
                continue;
            }
        };

        match write_one(&target.path, key, text) {
            Ok(()) => {
                info!("Added '{}' to {}", key, target.path.display());
                report.updated.push(target.path.clone());
            }
            Err(e) => {
                warn!("Failed to update {}: {}", target.path.display(), e);
                report.failed.push((target.path.clone(), e.to_string()));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn target(lang: &str, path: PathBuf) -> LocaleTarget {
        LocaleTarget::new(lang, path)
    }

    // ==================== set/get Tests ====================

    #[test]
    fn test_set_nested_into_empty() {
        let mut doc = json!({});
        set_nested_value(&mut doc, "common.hello", "Hello");
        assert_eq!(doc, json!({"common": {"hello": "Hello"}}));
    }

    #[test]
    fn test_set_nested_single_segment() {
        let mut doc = json!({"a": "1"});
        set_nested_value(&mut doc, "title", "Title");
        assert_eq!(doc, json!({"a": "1", "title": "Title"}));
    }

    #[test]
    fn test_set_nested_keeps_siblings() {
        let mut doc = json!({"common": {"bye": "Bye"}, "other": {"x": "y"}});
        set_nested_value(&mut doc, "common.hello", "Hello");
        assert_eq!(
            doc,
            json!({"common": {"bye": "Bye", "hello": "Hello"}, "other": {"x": "y"}})
        );
    }

    #[test]
    fn test_set_nested_overwrites_non_object_intermediate() {
        let mut doc = json!({"common": "flat string"});
        set_nested_value(&mut doc, "common.hello", "Hello");
        assert_eq!(doc, json!({"common": {"hello": "Hello"}}));
    }

    #[test]
    fn test_set_nested_overwrites_existing_leaf() {
        let mut doc = json!({"a": {"b": "old"}});
        set_nested_value(&mut doc, "a.b", "new");
        assert_eq!(doc, json!({"a": {"b": "new"}}));
    }

    #[test]
    fn test_set_nested_preserves_key_order() {
        let mut doc: Value = serde_json::from_str(r#"{"z": "1", "a": "2"}"#).unwrap();
        set_nested_value(&mut doc, "m.n", "3");
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_get_nested_value() {
        let doc = json!({"a": {"b": {"c": "deep"}}, "s": "str"});
        assert_eq!(get_nested_value(&doc, "a.b.c"), Some(&json!("deep")));
        assert_eq!(get_nested_value(&doc, "a.b"), Some(&json!({"c": "deep"})));
        assert_eq!(get_nested_value(&doc, "a.x"), None);
        assert_eq!(get_nested_value(&doc, "s.t"), None);
    }

    // ==================== load/save Tests ====================

    #[test]
    fn test_load_missing_file_is_empty_object() {
        let dir = TempDir::new().unwrap();
        let doc = load(&dir.path().join("missing.json")).unwrap();
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, StoreError::MalformedJson { .. }));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_load_non_object_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("array.json");
        fs::write(&path, "[1, 2]").unwrap();

        assert!(matches!(load(&path), Err(StoreError::NotAnObject { .. })));
    }

    #[test]
    fn test_save_creates_directories_and_formats() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("src/i18n/en.json");

        save(&path, &json!({"common": {"hello": "Hello"}})).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n  \"common\": {\n    \"hello\": \"Hello\"\n  }\n}\n");
    }

    #[test]
    fn test_save_keeps_non_ascii() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ko.json");

        save(&path, &json!({"hello": "안녕"})).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("안녕"));
        assert!(content.ends_with("}\n"));
        assert!(!content.ends_with("\n\n"));
    }

    // ==================== key_exists Tests ====================

    #[test]
    fn test_key_exists_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(!key_exists(&dir.path().join("en.json"), "a.b"));
    }

    #[test]
    fn test_key_exists_malformed_file_is_false() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("en.json");
        fs::write(&path, "{\"a\": ").unwrap();

        assert!(!key_exists(&path, "a.b"));
        assert!(load(&path).is_err());
    }

    #[test]
    fn test_key_exists_partial_and_full() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("en.json");
        save(&path, &json!({"a": {"b": "x", "n": null}})).unwrap();

        assert!(key_exists(&path, "a"));
        assert!(key_exists(&path, "a.b"));
        assert!(key_exists(&path, "a.n"));
        assert!(!key_exists(&path, "a.c"));
        assert!(!key_exists(&path, "a.b.c"));
    }

    // ==================== update_many Tests ====================

    #[test]
    fn test_update_many_end_to_end() {
        let dir = TempDir::new().unwrap();
        let en = dir.path().join("en.json");
        let ko = dir.path().join("ko.json");
        fs::write(&en, "{}\n").unwrap();
        fs::write(&ko, "{}\n").unwrap();

        let targets = vec![target("en", en.clone()), target("ko", ko.clone())];
        let translations: TranslationSet = [("en", "Hello"), ("ko", "안녕")].into_iter().collect();

        let report = update_many(&targets, "common.hello", &translations);

        assert_eq!(report.succeeded(), 2);
        assert!(!report.has_failures());
        assert_eq!(load(&en).unwrap(), json!({"common": {"hello": "Hello"}}));
        assert_eq!(load(&ko).unwrap(), json!({"common": {"hello": "안녕"}}));
        assert!(key_exists(&en, "common.hello"));
    }

    #[test]
    fn test_update_many_skips_missing_and_empty() {
        let dir = TempDir::new().unwrap();
        let targets = vec![
            target("en", dir.path().join("en.json")),
            target("ja", dir.path().join("ja.json")),
            target("hi", dir.path().join("hi.json")),
        ];
        let translations: TranslationSet = [("en", "Hello"), ("ja", "")].into_iter().collect();

        let report = update_many(&targets, "a.b", &translations);

        assert_eq!(report.updated, vec![dir.path().join("en.json")]);
        let skipped: Vec<&str> = report.skipped.iter().map(|t| t.language.as_str()).collect();
        assert_eq!(skipped, vec!["ja", "hi"]);
        assert!(!dir.path().join("ja.json").exists());
        assert!(!dir.path().join("hi.json").exists());
        assert_eq!(report.summary(), "1 succeeded, 0 failed, skipped: ja, hi");
    }

    #[test]
    fn test_update_many_continues_after_malformed_file() {
        let dir = TempDir::new().unwrap();
        let en = dir.path().join("en.json");
        let ko = dir.path().join("ko.json");
        fs::write(&en, "not json").unwrap();

        let targets = vec![target("en", en.clone()), target("ko", ko.clone())];
        let translations: TranslationSet = [("en", "Hello"), ("ko", "안녕")].into_iter().collect();

        let report = update_many(&targets, "common.hello", &translations);

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, en);
        assert!(report.failed[0].1.contains("Invalid JSON"));
        assert_eq!(fs::read_to_string(&en).unwrap(), "not json");
        assert_eq!(report.summary(), "1 succeeded, 1 failed");
    }

    #[test]
    fn test_update_many_preserves_unrelated_keys() {
        let dir = TempDir::new().unwrap();
        let en = dir.path().join("en.json");
        fs::write(&en, r#"{"nav": {"home": "Home"}, "common": {"bye": "Bye"}}"#).unwrap();

        let translations: TranslationSet = [("en", "Hello")].into_iter().collect();
        update_many(&[target("en", en.clone())], "common.hello", &translations);

        let content = fs::read_to_string(&en).unwrap();
        assert_eq!(
            content,
            "{\n  \"nav\": {\n    \"home\": \"Home\"\n  },\n  \"common\": {\n    \"bye\": \"Bye\",\n    \"hello\": \"Hello\"\n  }\n}\n"
        );
    }

    #[test]
    fn test_updated_display_is_relative() {
        let dir = TempDir::new().unwrap();
        let report = WriteReport {
            updated: vec![dir.path().join("src/i18n/en.json")],
            ..Default::default()
        };
        assert_eq!(
            report.updated_display(Some(dir.path())),
            vec![Path::new("src/i18n/en.json").display().to_string()]
        );
    }

    // ==================== Property Tests ====================

    fn key_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z0-9_-]{1,6}", 1..4).prop_map(|segments| segments.join("."))
    }

    proptest! {
        #[test]
        fn prop_set_then_get_roundtrip(key in key_strategy(), value in ".*") {
            let mut doc = json!({"untouched": {"leaf": "keep"}});
            set_nested_value(&mut doc, &key, value.clone());
            prop_assert_eq!(get_nested_value(&doc, &key), Some(&Value::String(value)));
            if !key.starts_with("untouched") {
                prop_assert_eq!(get_nested_value(&doc, "untouched.leaf"), Some(&json!("keep")));
            }
        }

        #[test]
        fn prop_set_is_idempotent(key in key_strategy(), value in ".*") {
            let mut once = json!({"a": {"b": "c"}});
            set_nested_value(&mut once, &key, value.clone());
            let mut twice = once.clone();
            set_nested_value(&mut twice, &key, value);
            prop_assert_eq!(once, twice);
        }
    }
}
