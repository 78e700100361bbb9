//! Translation key extraction and validation.
//!
//! A key is a dotted path such as `settings.general.language`. Keys come
//! either bare or wrapped in a translation call, `t('settings.title')`.

use crate::error::KeyError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static CALL_REGEX: OnceLock<Regex> = OnceLock::new();
static SEGMENT_REGEX: OnceLock<Regex> = OnceLock::new();

fn call_regex() -> &'static Regex {
    // regex has no backreferences, so each quote style gets its own branch
    CALL_REGEX.get_or_init(|| Regex::new(r#"\bt\((?:'(.+?)'|"(.+?)")\)"#).expect("valid regex"))
}

fn segment_regex() -> &'static Regex {
    SEGMENT_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"))
}

/// How strictly keys are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// Input must be wrapped in `t(...)` and the key needs at least two segments.
    #[default]
    Strict,
    /// Bare input is accepted as the key and a single segment is enough.
    Lenient,
}

/// A validated, dot-delimited translation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey(String);

impl TranslationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for TranslationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TranslationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Pull a key out of arbitrary text.
///
/// The first `t('...')` / `t("...")` call wins. Without a call, lenient mode
/// falls back to the trimmed text itself; strict mode gives up.
pub fn extract_key(text: &str, mode: KeyMode) -> Option<String> {
    if let Some(caps) = call_regex().captures(text) {
        let quoted = caps.get(1).or_else(|| caps.get(2))?;
        return Some(quoted.as_str().to_string());
    }

    match mode {
        KeyMode::Strict => None,
        KeyMode::Lenient => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
    }
}

/// Check a key against the segment rules for `mode`.
pub fn validate_key(key: &str, mode: KeyMode) -> Result<TranslationKey, KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }

    let segments: Vec<&str> = key.split('.').collect();

    if segments.iter().any(|s| s.is_empty()) {
        return Err(KeyError::EmptySegment {
            key: key.to_string(),
        });
    }

    if let Some(bad) = segments.iter().find(|s| !segment_regex().is_match(s)) {
        return Err(KeyError::InvalidSegment {
            key: key.to_string(),
            segment: bad.to_string(),
        });
    }

    if mode == KeyMode::Strict && segments.len() < 2 {
        return Err(KeyError::MissingDot {
            key: key.to_string(),
        });
    }

    Ok(TranslationKey(key.to_string()))
}

pub fn is_valid_key(key: &str, mode: KeyMode) -> bool {
    validate_key(key, mode).is_ok()
}

/// Extract and validate in one step.
pub fn parse_key(text: &str, mode: KeyMode) -> Result<TranslationKey, KeyError> {
    let key = extract_key(text, mode).ok_or_else(|| {
        if text.trim().is_empty() {
            KeyError::Empty
        } else {
            KeyError::NotFound {
                input: text.trim().to_string(),
            }
        }
    })?;
    validate_key(&key, mode)
}
