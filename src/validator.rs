//! Translation quality validation.
//!
//! Checks that interpolation placeholders (`{{name}}`) and markup tags
//! (`<bold>`, `</bold>`, `<br/>`) in the source text survive translation.
//! Word order differs between languages, so tokens are compared as sorted
//! multisets rather than sequences.

use regex::Regex;
use std::sync::OnceLock;

/// Validation report containing warnings about a translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Validator for placeholder and markup preservation.
pub struct TranslationValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    pub fn validate(original: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::default();

        let orig_placeholders = Self::extract_placeholders(original);
        let trans_placeholders = Self::extract_placeholders(translated);
        if orig_placeholders != trans_placeholders {
            report.warnings.push(format!(
                "Placeholder mismatch: original has {:?}, translation has {:?}",
                orig_placeholders, trans_placeholders
            ));
        }

        let orig_tags = Self::extract_tags(original);
        let trans_tags = Self::extract_tags(translated);
        if orig_tags != trans_tags {
            report.warnings.push(format!(
                "Markup tag mismatch: original has {:?}, translation has {:?}",
                orig_tags, trans_tags
            ));
        }

        report
    }

    fn extract_placeholders(text: &str) -> Vec<String> {
        let regex =
            PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{\{\s*[^{}]+?\s*\}\}").unwrap());

        let mut found: Vec<String> = regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();
        found.sort();
        found
    }

    fn extract_tags(text: &str) -> Vec<String> {
        let regex = TAG_REGEX.get_or_init(|| Regex::new(r"</?[A-Za-z][A-Za-z0-9_-]*\s*/?>").unwrap());

        let mut found: Vec<String> = regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();
        found.sort();
        found
    }
}
