//! lingpick: add translation keys to per-language JSON locale files.
//!
//! A key such as `common.hello` (or a snippet like `t('common.hello')`) is
//! written into every locale file at the nested path it names. Translations
//! are typed in by hand or produced by Gemini from a single source text.

pub mod command;
pub mod config;
pub mod credentials;
pub mod discovery;
pub mod error;
pub mod gemini;
pub mod key;
pub mod paths;
pub mod retry;
pub mod source;
pub mod store;
pub mod translations;
pub mod translator;
pub mod validator;

pub use error::{KeyError, LingpickError, Result, StoreError};
pub use key::{KeyMode, TranslationKey};
pub use paths::LocaleTarget;
pub use translations::TranslationSet;
