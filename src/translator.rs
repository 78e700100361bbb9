//! Automatic translation through a text-generation model.
//!
//! One prompt asks for every target language at once; the model must answer
//! with a JSON object keyed by language code. Failed attempts are retried with
//! exponential backoff, and once retries run out every language falls back to
//! the untranslated source text. [`translate`] therefore never fails.

use crate::retry::{with_retry, RetryConfig};
use crate::translations::TranslationSet;
use crate::validator::TranslationValidator;
use anyhow::{anyhow, bail, Result};
use serde_json::{Map, Value};
use std::future::Future;
use tracing::{debug, info};

/// A remote model that turns a prompt into raw text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>>;
}

/// What to translate, and into which languages.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub source_text: String,
    /// Human-readable name of the source language, e.g. "Korean"
    pub source_language: String,
    pub languages: Vec<String>,
}

/// Result of [`translate`].
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub translations: TranslationSet,
    /// Set when retries were exhausted and the source text was used instead.
    pub fallback_reason: Option<String>,
    /// Placeholder/markup problems found in a successful translation.
    pub warnings: Vec<String>,
}

impl TranslationOutcome {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

pub(crate) fn build_prompt(request: &TranslationRequest) -> String {
    let language_list = request.languages.join(", ");
    let format_lines = request
        .languages
        .iter()
        .map(|lang| format!("  \"{}\": \"translation here\"", lang))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"You are a professional i18n translator specializing in software localization.
Source language is {source}.

Translate the following {source} text to: {languages}

IMPORTANT RULES:
1. HTML tags like <bold>, <highlight>, <i>, <br/> must be preserved exactly as-is
2. Variables like {{{{name}}}}, {{{{email}}}} must be preserved exactly as-is
3. Return ONLY a valid JSON object in this format:
{{
{format}
}}
4. Do not add any markdown formatting, backticks, or additional text
5. Maintain appropriate formality and tone based on context

{source} text to translate:
{text}

Return the JSON object only:"#,
        source = request.source_language,
        languages = language_list,
        format = format_lines,
        text = request.source_text,
    )
}

/// Find the first JSON object embedded in a model response.
///
/// Each `{` is tried as the start of a JSON value with a streaming parser, so
/// prose before the object, trailing text after it and markdown fences are
/// tolerated, and braces inside string values are handled correctly.
pub(crate) fn extract_json_object(text: &str) -> Result<Map<String, Value>> {
    let mut first_error = None;

    for (start, _) in text.match_indices('{') {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Object(map))) => return Ok(map),
            Some(Err(e)) if first_error.is_none() => first_error = Some(e),
            _ => {}
        }
    }

    match first_error {
        Some(e) => Err(anyhow!("Failed to parse JSON object in response: {}", e)),
        None => bail!("No JSON object found in response"),
    }
}

/// Check that every requested language has a non-blank string.
pub(crate) fn collect_translations(
    object: &Map<String, Value>,
    languages: &[String],
) -> Result<TranslationSet> {
    let mut set = TranslationSet::new();
    for lang in languages {
        match object.get(lang) {
            Some(Value::String(text)) if !text.trim().is_empty() => set.insert(lang.clone(), text.clone()),
            Some(Value::String(_)) => bail!("Empty translation for language: {}", lang),
            Some(other) => bail!("Translation for language {} is not a string: {}", lang, other),
            None => bail!("Missing translation for language: {}", lang),
        }
    }
    Ok(set)
}

async fn attempt<G: TextGenerator>(
    generator: &G,
    prompt: &str,
    languages: &[String],
) -> Result<TranslationSet> {
    let raw = generator.generate(prompt).await?;
    let object = extract_json_object(&raw)?;
    collect_translations(&object, languages)
}

/// Translate `request.source_text` into every requested language.
pub async fn translate<G: TextGenerator>(
    generator: &G,
    request: &TranslationRequest,
    retry: &RetryConfig,
) -> TranslationOutcome {
    if request.languages.is_empty() {
        return TranslationOutcome {
            translations: TranslationSet::new(),
            fallback_reason: None,
            warnings: Vec::new(),
        };
    }

    let prompt = build_prompt(request);
    let prompt = prompt.as_str();
    let languages = request.languages.as_slice();

    let result = with_retry(retry, "Translation", move |_| async move {
        attempt(generator, prompt, languages).await
    })
    .await;

    match result {
        Ok(translations) => {
            info!("Translated into {} language(s)", translations.len());
            let warnings = translations
                .iter()
                .flat_map(|(lang, text)| {
                    TranslationValidator::validate(&request.source_text, text)
                        .warnings
                        .into_iter()
                        .map(move |w| format!("{}: {}", lang, w))
                })
                .collect::<Vec<_>>();
            for w in &warnings {
                debug!("Translation validation warning for {}", w);
            }
            TranslationOutcome {
                translations,
                fallback_reason: None,
                warnings,
            }
        }
        Err(e) => {
            debug!(
                "All {} translation attempts failed, using source text: {:#}",
                retry.max_attempts, e
            );
            TranslationOutcome {
                translations: TranslationSet::uniform(&request.languages, &request.source_text),
                fallback_reason: Some(format!("{:#}", e)),
                warnings: Vec::new(),
            }
        }
    }
}
