//! The "add translation key" command and its read-only companions.
//!
//! Flow: parse the key, find the target files, refuse if the key already
//! exists anywhere, collect translations from the configured source, then
//! write each file independently.

use crate::config::{Config, SourceKind};
use crate::credentials::CredentialProvider;
use crate::discovery::{detect_known_locale, discover_locale_files, discover_targets};
use crate::error::{LingpickError, Result};
use crate::gemini::GeminiClient;
use crate::key::{parse_key, KeyMode, TranslationKey};
use crate::paths::{relative_path, resolve_file_paths, LocaleTarget};
use crate::retry::RetryConfig;
use crate::source::{
    resolve_api_key, unique_languages, ApiSource, ManualSource, Prompter, TranslationSource,
};
use crate::store::{key_exists, update_many, WriteReport};
use std::path::{Path, PathBuf};
use tracing::info;

/// Per-invocation options for `add`.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Bare key or code containing `t('...')`
    pub input: String,
    pub mode: KeyMode,
    /// Source text for machine translation; prompted for when absent
    pub source_text: Option<String>,
}

/// Key and files an `add` will touch, after all pre-flight checks passed.
#[derive(Debug, Clone)]
pub struct PreparedAdd {
    pub key: TranslationKey,
    pub targets: Vec<LocaleTarget>,
}

impl PreparedAdd {
    pub fn languages(&self) -> Vec<String> {
        let all: Vec<String> = self.targets.iter().map(|t| t.language.clone()).collect();
        unique_languages(&all)
    }
}

#[derive(Debug)]
pub struct AddOutcome {
    pub key: TranslationKey,
    pub report: WriteReport,
    /// Fallback and validation notices for the user
    pub warnings: Vec<String>,
}

impl AddOutcome {
    /// Single-line summary for the user.
    pub fn message(&self) -> String {
        let mut message = format!(
            "Added translation key \"{}\" to {} file(s)",
            self.key,
            self.report.succeeded()
        );
        if self.report.has_failures() {
            message.push_str(&format!(" ({} failed)", self.report.failed.len()));
        }
        message
    }

    /// Summary plus per-file lines for stdout. Warnings are not included;
    /// they go to the log.
    pub fn report_lines(&self, root: &Path) -> Vec<String> {
        let mut lines = vec![self.message()];
        lines.extend(
            self.report
                .updated_display(Some(root))
                .into_iter()
                .map(|path| format!("  {}", path)),
        );
        lines.extend(
            self.report
                .failed
                .iter()
                .map(|(path, error)| format!("  failed: {} ({})", display(root, path), error)),
        );
        lines
    }
}

fn ensure_project_root(config: &Config) -> Result<()> {
    if config.project_root.is_dir() {
        Ok(())
    } else {
        Err(LingpickError::ProjectRootNotFound {
            root: config.project_root.clone(),
        })
    }
}

/// Files to write: the configured pattern, or discovery when there is none.
pub fn resolve_targets(config: &Config) -> Result<Vec<LocaleTarget>> {
    ensure_project_root(config)?;
    match &config.files_path {
        Some(pattern) => {
            resolve_file_paths(Some(config.project_root.as_path()), pattern, &config.languages)
        }
        None => discover_targets(&config.project_root),
    }
}

fn display(root: &Path, path: &Path) -> String {
    relative_path(Some(root), path).display().to_string()
}

/// Parse the key, resolve targets and make sure the key is new everywhere.
pub fn prepare_add(config: &Config, options: &AddOptions) -> Result<PreparedAdd> {
    let key = parse_key(&options.input, options.mode)?;
    let targets = resolve_targets(config)?;

    let existing: Vec<String> = targets
        .iter()
        .filter(|t| key_exists(&t.path, key.as_str()))
        .map(|t| display(&config.project_root, &t.path))
        .collect();

    if !existing.is_empty() {
        return Err(LingpickError::KeyAlreadyExists {
            key: key.to_string(),
            files: existing,
        });
    }

    Ok(PreparedAdd { key, targets })
}

/// Collect translations and write them.
pub async fn apply_add<S: TranslationSource>(prepared: PreparedAdd, source: &S) -> Result<AddOutcome> {
    let languages = prepared.languages();
    let provided = source.provide(&prepared.key, &languages).await?;

    let report = update_many(&prepared.targets, prepared.key.as_str(), &provided.translations);
    info!("Write result for '{}': {}", prepared.key, report.summary());

    if report.succeeded() == 0 {
        return Err(LingpickError::NothingWritten {
            key: prepared.key.to_string(),
            failed: report.failed.len(),
        });
    }

    Ok(AddOutcome {
        key: prepared.key,
        report,
        warnings: provided.warnings,
    })
}

/// Full `add` with the source chosen by configuration.
pub async fn run_add<P: Prompter, C: CredentialProvider>(
    config: &Config,
    options: &AddOptions,
    prompter: &P,
    credentials: &C,
) -> Result<AddOutcome> {
    let prepared = prepare_add(config, options)?;

    match config.source {
        SourceKind::Manual => apply_add(prepared, &ManualSource::new(prompter)).await,
        SourceKind::Gemini => {
            let api_key = resolve_api_key(credentials, prompter)?;
            let client = GeminiClient::new(api_key, config.gemini_model.clone())
                .with_api_url(config.gemini_api_url.clone());
            let source = ApiSource::new(client, prompter, config.source_language.clone())
                .with_source_text(options.source_text.clone())
                .with_retry(RetryConfig::translation(config.max_retries));
            apply_add(prepared, &source).await
        }
    }
}

/// Existence of a key in one target file.
#[derive(Debug, Clone)]
pub struct KeyPresence {
    pub target: LocaleTarget,
    pub exists: bool,
}

pub fn check_key(config: &Config, input: &str, mode: KeyMode) -> Result<(TranslationKey, Vec<KeyPresence>)> {
    let key = parse_key(input, mode)?;
    let presence = resolve_targets(config)?
        .into_iter()
        .map(|target| {
            let exists = key_exists(&target.path, key.as_str());
            KeyPresence { target, exists }
        })
        .collect();
    Ok((key, presence))
}

/// A discovered file with its detected tag (`None` when the name was not recognized).
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub locale: Option<String>,
}

pub fn discover(config: &Config) -> Result<Vec<DiscoveredFile>> {
    ensure_project_root(config)?;
    let files = discover_locale_files(&config.project_root)?;
    if files.is_empty() {
        return Err(LingpickError::NoLocaleFilesFound {
            root: config.project_root.clone(),
        });
    }
    Ok(files
        .into_iter()
        .map(|path| DiscoveredFile {
            locale: detect_known_locale(&path),
            path,
        })
        .collect())
}
