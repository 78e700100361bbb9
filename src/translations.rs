//! Ordered language → text mapping produced by a translation source.

use serde_json::{Map, Value};

/// One translated string per requested language, in request order.
///
/// Empty strings are allowed and mean "no translation for this language".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationSet {
    entries: Vec<(String, String)>,
}

impl TranslationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every language mapped to the same text.
    pub fn uniform(languages: &[String], text: &str) -> Self {
        let mut set = Self::new();
        for lang in languages {
            set.insert(lang.clone(), text);
        }
        set
    }

    /// Insert or replace the entry for `language`, keeping its first position.
    pub fn insert(&mut self, language: impl Into<String>, text: impl Into<String>) {
        let language = language.into();
        let text = text.into();
        match self.entries.iter_mut().find(|(lang, _)| *lang == language) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((language, text)),
        }
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(lang, _)| lang == language)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a JSON object, e.g. for logging a provider result.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(l, t)| (l.clone(), Value::String(t.clone())))
            .collect();
        Value::Object(map)
    }
}

impl<L: Into<String>, T: Into<String>> FromIterator<(L, T)> for TranslationSet {
    fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (lang, text) in iter {
            set.insert(lang, text);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut set = TranslationSet::new();
        set.insert("en", "Hello");
        set.insert("ko", "안녕");
        set.insert("en", "Hi");

        let entries: Vec<_> = set.iter().collect();
        assert_eq!(entries, vec![("en", "Hi"), ("ko", "안녕")]);
    }

    #[test]
    fn test_uniform() {
        let langs = vec!["en".to_string(), "ja".to_string()];
        let set = TranslationSet::uniform(&langs, "안녕");
        assert_eq!(set.get("en"), Some("안녕"));
        assert_eq!(set.get("ja"), Some("안녕"));
        assert_eq!(set.get("ko"), None);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_to_json_order() {
        let set: TranslationSet = [("ko", "가"), ("en", "A")].into_iter().collect();
        assert_eq!(set.to_json().to_string(), r#"{"ko":"가","en":"A"}"#);
    }
}
