//! Where the Gemini API key comes from.
//!
//! Providers are injected into the Gemini source so translation can be tested
//! without touching the user's real settings.

use crate::error::{LingpickError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub trait CredentialProvider {
    /// The stored key, if any. Blank values count as absent.
    fn api_key(&self) -> Result<Option<String>>;

    /// Persist a key for later runs.
    fn store_api_key(&self, key: &str) -> Result<()>;
}

/// Reads the key from the environment. Storing is not supported.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new() -> Self {
        Self::with_var(API_KEY_ENV)
    }

    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Result<Option<String>> {
        Ok(std::env::var(&self.var)
            .ok()
            .filter(|v| !v.trim().is_empty()))
    }

    fn store_api_key(&self, _key: &str) -> Result<()> {
        Err(LingpickError::Credentials(format!(
            "cannot persist into environment variable {}",
            self.var
        )))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gemini_api_key: Option<String>,
}

/// JSON credentials file in the user's config directory.
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/lingpick/credentials.json`, when the platform has a config dir.
    pub fn user_default() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("lingpick").join("credentials.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<CredentialsFile> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                LingpickError::Credentials(format!("{} is not valid JSON: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CredentialsFile::default()),
            Err(e) => Err(LingpickError::Credentials(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl CredentialProvider for FileCredentials {
    fn api_key(&self) -> Result<Option<String>> {
        Ok(self
            .read()?
            .gemini_api_key
            .filter(|v| !v.trim().is_empty()))
    }

    fn store_api_key(&self, key: &str) -> Result<()> {
        let mut file = self.read().unwrap_or_default();
        file.gemini_api_key = Some(key.to_string());

        let io_err = |e: std::io::Error| {
            LingpickError::Credentials(format!("failed to write {}: {}", self.path.display(), e))
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| LingpickError::Credentials(e.to_string()))?;
        write_private(&self.path, &(content + "\n")).map_err(io_err)?;

        info!("Saved Gemini API key to {}", self.path.display());
        Ok(())
    }
}

/// Write a file readable by its owner only (0600 on Unix).
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // mode() only applies on creation; tighten files left by older runs
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(content.as_bytes())
}

/// Environment first, then the credentials file; stores into the file.
#[derive(Debug, Clone)]
pub struct ChainedCredentials {
    env: EnvCredentials,
    file: Option<FileCredentials>,
}

impl ChainedCredentials {
    pub fn new(env: EnvCredentials, file: Option<FileCredentials>) -> Self {
        Self { env, file }
    }

    pub fn user_default() -> Self {
        Self::new(EnvCredentials::new(), FileCredentials::user_default())
    }
}

impl CredentialProvider for ChainedCredentials {
    fn api_key(&self) -> Result<Option<String>> {
        if let Some(key) = self.env.api_key()? {
            debug!("Using Gemini API key from environment");
            return Ok(Some(key));
        }
        match &self.file {
            Some(file) => file.api_key(),
            None => Ok(None),
        }
    }

    fn store_api_key(&self, key: &str) -> Result<()> {
        match &self.file {
            Some(file) => file.store_api_key(key),
            None => Err(LingpickError::Credentials(
                "no user config directory to store the API key in".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_env_credentials() {
        std::env::set_var("LINGPICK_TEST_KEY", "env-key");
        let creds = EnvCredentials::with_var("LINGPICK_TEST_KEY");
        assert_eq!(creds.api_key().unwrap(), Some("env-key".to_string()));

        std::env::set_var("LINGPICK_TEST_KEY", "   ");
        assert_eq!(creds.api_key().unwrap(), None);

        std::env::remove_var("LINGPICK_TEST_KEY");
        assert_eq!(creds.api_key().unwrap(), None);
        assert!(creds.store_api_key("x").is_err());
    }

    #[test]
    fn test_file_credentials_roundtrip() {
        let dir = TempDir::new().unwrap();
        let creds = FileCredentials::new(dir.path().join("nested/credentials.json"));

        assert_eq!(creds.api_key().unwrap(), None);
        creds.store_api_key("file-key").unwrap();
        assert_eq!(creds.api_key().unwrap(), Some("file-key".to_string()));

        let content = fs::read_to_string(creds.path()).unwrap();
        assert!(content.contains("\"gemini_api_key\": \"file-key\""));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_credentials_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        FileCredentials::new(&path).store_api_key("secret").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_credentials_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "nope").unwrap();

        let err = FileCredentials::new(&path).api_key().unwrap_err();
        assert!(matches!(err, LingpickError::Credentials(_)));
    }

    #[test]
    #[serial]
    fn test_chained_prefers_env() {
        let dir = TempDir::new().unwrap();
        let file = FileCredentials::new(dir.path().join("credentials.json"));
        file.store_api_key("file-key").unwrap();

        std::env::set_var("LINGPICK_TEST_CHAIN_KEY", "env-key");
        let chained = ChainedCredentials::new(
            EnvCredentials::with_var("LINGPICK_TEST_CHAIN_KEY"),
            Some(file.clone()),
        );
        assert_eq!(chained.api_key().unwrap(), Some("env-key".to_string()));

        std::env::remove_var("LINGPICK_TEST_CHAIN_KEY");
        assert_eq!(chained.api_key().unwrap(), Some("file-key".to_string()));

        chained.store_api_key("new-key").unwrap();
        assert_eq!(file.api_key().unwrap(), Some("new-key".to_string()));
    }

    #[test]
    #[serial]
    fn test_chained_without_file() {
        std::env::remove_var("LINGPICK_TEST_NOFILE_KEY");
        let chained =
            ChainedCredentials::new(EnvCredentials::with_var("LINGPICK_TEST_NOFILE_KEY"), None);
        assert_eq!(chained.api_key().unwrap(), None);
        assert!(chained.store_api_key("k").is_err());
    }
}
