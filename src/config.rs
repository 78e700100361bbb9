use crate::gemini::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::paths::LANG_PLACEHOLDER;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_LANGUAGES: &[&str] = &["ko", "en", "ja", "hi"];
pub const DEFAULT_FILES_PATH: &str = "src/i18n/{lang}.json";

/// Where translations come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Prompt for every language
    Manual,
    /// Translate a single source text with Gemini
    Gemini,
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "gemini" | "api" | "auto" => Ok(Self::Gemini),
            other => bail!("Unknown translation source '{}' (expected manual or gemini)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Project
    pub project_root: PathBuf,
    pub languages: Vec<String>,
    /// `{lang}` path pattern; `None` switches to locale file discovery
    pub files_path: Option<String>,

    // Translation
    pub source: SourceKind,
    pub source_language: String,
    pub max_retries: u32,

    // Gemini
    pub gemini_model: String,
    pub gemini_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let project_root = match std::env::var("LINGPICK_PROJECT_ROOT") {
            Ok(root) if !root.trim().is_empty() => PathBuf::from(root),
            _ => std::env::current_dir().context("Failed to determine current directory")?,
        };

        let config = Self {
            project_root,

            languages: std::env::var("LINGPICK_LANGUAGES")
                .ok()
                .map(|v| parse_languages(&v))
                .filter(|langs| !langs.is_empty())
                .unwrap_or_else(default_languages),

            // An explicitly empty pattern means "discover locale files"
            files_path: match std::env::var("LINGPICK_FILES_PATH") {
                Ok(v) if v.trim().is_empty() => None,
                Ok(v) => Some(v),
                Err(_) => Some(DEFAULT_FILES_PATH.to_string()),
            },

            source: std::env::var("LINGPICK_SOURCE")
                .ok()
                .map(|v| v.parse::<SourceKind>())
                .transpose()
                .context("Invalid LINGPICK_SOURCE")?
                .unwrap_or(SourceKind::Gemini),
            source_language: std::env::var("LINGPICK_SOURCE_LANGUAGE")
                .unwrap_or_else(|_| "Korean".to_string()),
            max_retries: std::env::var("LINGPICK_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            gemini_api_url: std::env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would silently misbehave
    pub fn validate(&self) -> Result<()> {
        if let Some(pattern) = &self.files_path {
            if !pattern.contains(LANG_PLACEHOLDER) {
                bail!(
                    "Translation files path '{}' must contain a {} placeholder",
                    pattern,
                    LANG_PLACEHOLDER
                );
            }
        }
        if self.languages.is_empty() {
            bail!("At least one language must be configured");
        }
        Ok(())
    }
}

pub fn default_languages() -> Vec<String> {
    DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect()
}

/// Split a comma-separated language list, dropping blanks.
pub fn parse_languages(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
