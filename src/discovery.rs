//! Heuristic locale file discovery.
//!
//! Used when no `{lang}` path pattern is configured: any `*.json` file below a
//! conventionally named directory is treated as a locale file, and its
//! language tag is taken from the file name.

use crate::error::{LingpickError, Result};
use crate::paths::LocaleTarget;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names that mark their contents as locale files.
pub const LOCALE_DIR_NAMES: &[&str] = &[
    "locales",
    "locale",
    "i18n",
    "lang",
    "languages",
    "translations",
];

/// Directories never searched.
pub const EXCLUDED_DIR_NAMES: &[&str] = &["node_modules", ".git", "target"];

static LOCALE_PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();

fn locale_patterns() -> &'static [Regex; 2] {
    LOCALE_PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?i)^(en|ko|ja|zh|es|fr|de|it|pt|ru|ar|hi)(-[A-Z]{2})?$")
                .expect("valid regex"),
            Regex::new(r"(?i)^(en|ko|ja|zh|es|fr|de|it|pt|ru|ar|hi)_[A-Z]{2}$")
                .expect("valid regex"),
        ]
    })
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIR_NAMES.contains(&name))
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// True when some directory between `root` and the file is a locale directory.
fn under_locale_dir(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .parent()
        .map(|dir| {
            dir.components().any(|c| {
                c.as_os_str()
                    .to_str()
                    .is_some_and(|name| LOCALE_DIR_NAMES.contains(&name))
            })
        })
        .unwrap_or(false)
}

/// Find candidate locale files below `root`.
///
/// Returns de-duplicated paths in sorted order. Unreadable subdirectories are
/// logged and skipped; an unreadable root is an error.
pub fn discover_locale_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = BTreeSet::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_excluded(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(LingpickError::Discovery {
                    root: root.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                warn!("Skipping unreadable entry during discovery: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_file() && is_json(path) && under_locale_dir(root, path) {
            debug!("Discovered locale file {}", path.display());
            found.insert(path.to_path_buf());
        }
    }

    Ok(found.into_iter().collect())
}

fn basename(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_locale_code(name: &str) -> bool {
    locale_patterns().iter().any(|re| re.is_match(name))
}

/// Locale tag if the file name, or failing that its directory, is a
/// recognized language code.
///
/// The directory covers namespaced layouts such as `locales/ko/common.json`.
pub fn detect_known_locale(path: &Path) -> Option<String> {
    let name = basename(path);
    if is_locale_code(&name) {
        return Some(name);
    }

    path.parent()
        .and_then(Path::file_name)
        .and_then(|dir| dir.to_str())
        .filter(|dir| is_locale_code(dir))
        .map(String::from)
}

/// Locale tag for a file. Never fails: unrecognized names yield the basename.
pub fn detect_locale(path: &Path) -> String {
    detect_known_locale(path).unwrap_or_else(|| basename(path))
}

/// Root-relative path without extension, `/`-separated.
fn qualified_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Discover files and pair each with its detected tag.
///
/// Files sharing a recognized language code share its tag. Unrecognized
/// basenames that occur more than once are replaced by the file's qualified
/// name so that distinct files never share a translation by accident.
pub fn discover_targets(root: &Path) -> Result<Vec<LocaleTarget>> {
    let files = discover_locale_files(root)?;
    if files.is_empty() {
        return Err(LingpickError::NoLocaleFilesFound {
            root: root.to_path_buf(),
        });
    }

    let detected: Vec<(PathBuf, Option<String>)> = files
        .into_iter()
        .map(|path| {
            let known = detect_known_locale(&path);
            (path, known)
        })
        .collect();

    let mut unrecognized: HashMap<String, usize> = HashMap::new();
    for (path, known) in &detected {
        if known.is_none() {
            *unrecognized.entry(basename(path)).or_default() += 1;
        }
    }

    Ok(detected
        .into_iter()
        .map(|(path, known)| {
            let tag = known.unwrap_or_else(|| {
                let name = basename(&path);
                if unrecognized.get(&name).copied().unwrap_or(0) > 1 {
                    warn!("Ambiguous locale file name {}, using its path as the tag", path.display());
                    qualified_name(root, &path)
                } else {
                    name
                }
            });
            LocaleTarget::new(tag, path)
        })
        .collect())
}
