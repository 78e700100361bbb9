//! Translation sources: where the text for each language comes from.
//!
//! `ManualSource` asks the user for every language; `ApiSource` asks once for
//! the source text and lets a text-generation model translate it.

use crate::credentials::CredentialProvider;
use crate::error::{LingpickError, Result};
use crate::key::TranslationKey;
use crate::retry::RetryConfig;
use crate::translations::TranslationSet;
use crate::translator::{translate, TextGenerator, TranslationRequest};
use std::future::Future;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

/// Asks the user a question. `Ok(None)` means the prompt was dismissed.
pub trait Prompter {
    fn ask(&self, prompt: &str) -> Result<Option<String>>;
}

/// Prompts on stderr and reads one line from stdin; end of input cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&self, prompt: &str) -> Result<Option<String>> {
        let mut stderr = io::stderr();
        write!(stderr, "{}: ", prompt)?;
        stderr.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}

/// Translations plus anything the user should be told about them.
#[derive(Debug, Clone, Default)]
pub struct Provided {
    pub translations: TranslationSet,
    pub warnings: Vec<String>,
}

pub trait TranslationSource {
    fn provide(
        &self,
        key: &TranslationKey,
        languages: &[String],
    ) -> impl Future<Output = Result<Provided>>;
}

/// Languages in first-seen order without repeats.
pub fn unique_languages(languages: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(languages.len());
    for lang in languages {
        if !seen.contains(lang) {
            seen.push(lang.clone());
        }
    }
    seen
}

/// One prompt per language. Empty answers are kept and later skipped on write.
pub struct ManualSource<'a, P: Prompter> {
    prompter: &'a P,
}

impl<'a, P: Prompter> ManualSource<'a, P> {
    pub fn new(prompter: &'a P) -> Self {
        Self { prompter }
    }
}

impl<P: Prompter> TranslationSource for ManualSource<'_, P> {
    async fn provide(&self, key: &TranslationKey, languages: &[String]) -> Result<Provided> {
        let mut translations = TranslationSet::new();

        for lang in unique_languages(languages) {
            let prompt = format!("Enter translation for \"{}\" in {}", key, lang);
            match self.prompter.ask(&prompt)? {
                Some(text) => translations.insert(lang, text),
                None => {
                    info!("Translation cancelled at {}", lang);
                    return Err(LingpickError::UserCancelled);
                }
            }
        }

        Ok(Provided {
            translations,
            warnings: Vec::new(),
        })
    }
}

/// Machine translation of a single source text.
pub struct ApiSource<'a, G: TextGenerator, P: Prompter> {
    generator: G,
    prompter: &'a P,
    source_text: Option<String>,
    source_language: String,
    retry: RetryConfig,
}

impl<'a, G: TextGenerator, P: Prompter> ApiSource<'a, G, P> {
    pub fn new(generator: G, prompter: &'a P, source_language: impl Into<String>) -> Self {
        Self {
            generator,
            prompter,
            source_text: None,
            source_language: source_language.into(),
            retry: RetryConfig::default(),
        }
    }

    /// Use this text instead of prompting for it.
    pub fn with_source_text(mut self, text: Option<String>) -> Self {
        self.source_text = text;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn source_text(&self, key: &TranslationKey) -> Result<String> {
        let text = match &self.source_text {
            Some(text) => Some(text.clone()),
            None => self.prompter.ask(&format!(
                "Enter the {} text for \"{}\"",
                self.source_language, key
            ))?,
        };

        // a blank source text is treated like a dismissed prompt
        text.filter(|t| !t.trim().is_empty())
            .ok_or(LingpickError::UserCancelled)
    }
}

impl<G: TextGenerator, P: Prompter> TranslationSource for ApiSource<'_, G, P> {
    async fn provide(&self, key: &TranslationKey, languages: &[String]) -> Result<Provided> {
        let source_text = self.source_text(key)?;

        let request = TranslationRequest {
            source_text,
            source_language: self.source_language.clone(),
            languages: unique_languages(languages),
        };

        info!("Translating \"{}\" into {}", key, request.languages.join(", "));
        let outcome = translate(&self.generator, &request, &self.retry).await;

        let mut warnings = outcome.warnings;
        if let Some(reason) = outcome.fallback_reason {
            warnings.insert(
                0,
                format!(
                    "Translation failed after {} attempt(s), source text used for every language: {}",
                    self.retry.max_attempts, reason
                ),
            );
        }

        Ok(Provided {
            translations: outcome.translations,
            warnings,
        })
    }
}

/// Stored API key, or ask for one and persist it.
pub fn resolve_api_key<C: CredentialProvider, P: Prompter>(
    credentials: &C,
    prompter: &P,
) -> Result<String> {
    if let Some(key) = credentials.api_key()? {
        return Ok(key);
    }

    let key = prompter
        .ask("Enter your Gemini API key")?
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or(LingpickError::UserCancelled)?;

    if let Err(e) = credentials.store_api_key(&key) {
        warn!("API key will not be remembered: {}", e);
    }
    Ok(key)
}
