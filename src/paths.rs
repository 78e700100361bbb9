//! Resolve `{lang}` path patterns into per-language locale files.

use crate::error::{LingpickError, Result};
use std::path::{Path, PathBuf};

/// Placeholder substituted with each language code.
pub const LANG_PLACEHOLDER: &str = "{lang}";

/// A locale file together with the language it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleTarget {
    pub language: String,
    pub path: PathBuf,
}

impl LocaleTarget {
    pub fn new(language: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            language: language.into(),
            path: path.into(),
        }
    }
}

/// Expand `pattern` once per language and join it onto `root`.
///
/// Language order is preserved. Files are not checked for existence.
pub fn resolve_file_paths(
    root: Option<&Path>,
    pattern: &str,
    languages: &[String],
) -> Result<Vec<LocaleTarget>> {
    let root = root.ok_or(LingpickError::NoProjectRoot)?;

    Ok(languages
        .iter()
        .map(|lang| {
            let relative = pattern.replacen(LANG_PLACEHOLDER, lang, 1);
            LocaleTarget::new(lang.clone(), root.join(relative))
        })
        .collect())
}

/// Path relative to the project root, for display.
///
/// Falls back to the path as given when there is no root or the path lies
/// outside it.
pub fn relative_path(root: Option<&Path>, absolute: &Path) -> PathBuf {
    match root {
        Some(root) => absolute
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| absolute.to_path_buf()),
        None => absolute.to_path_buf(),
    }
}
