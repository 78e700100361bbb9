use std::path::PathBuf;
use thiserror::Error;

/// Why a translation key was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("Translation key cannot be empty")]
    Empty,

    #[error("Translation key '{key}' contains an empty segment (check for leading, trailing or doubled dots)")]
    EmptySegment { key: String },

    #[error("Translation key '{key}' has an invalid segment '{segment}': only letters, numbers, hyphens and underscores are allowed")]
    InvalidSegment { key: String, segment: String },

    #[error("Translation key '{key}' must contain at least one dot (e.g. \"feature.title\")")]
    MissingDot { key: String },

    #[error("No translation key found in '{input}' (expected t('key.name') or t(\"key.name\"))")]
    NotFound { input: String },
}

/// Errors raised by the JSON store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Top-level value in {path} is not a JSON object")]
    NotAnObject { path: PathBuf },
}

impl StoreError {
    /// True when the file exists but could not be parsed as a JSON object.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedJson { .. } | Self::NotAnObject { .. })
    }
}

/// Command-level failures surfaced to the user as a single message.
#[derive(Debug, Error)]
pub enum LingpickError {
    /// The user dismissed a prompt. Reported as information, not as a failure.
    #[error("Cancelled")]
    UserCancelled,

    #[error("No project root is available (pass --root or set LINGPICK_PROJECT_ROOT)")]
    NoProjectRoot,

    #[error("Project root {root} does not exist or is not a directory")]
    ProjectRootNotFound { root: PathBuf },

    #[error("No locale JSON files found under {root}")]
    NoLocaleFilesFound { root: PathBuf },

    #[error(transparent)]
    InvalidKeyFormat(#[from] KeyError),

    #[error("Translation key '{key}' already exists in: {}", .files.join(", "))]
    KeyAlreadyExists { key: String, files: Vec<String> },

    #[error("Failed to add translation key '{key}' to any file ({failed} failed)")]
    NothingWritten { key: String, failed: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to scan {root}: {source}")]
    Discovery {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read input: {0}")]
    Prompt(#[from] std::io::Error),

    #[error("Credential storage error: {0}")]
    Credentials(String),
}

pub type Result<T> = std::result::Result<T, LingpickError>;
