//! Persisted token storage.
//!
//! Only the session token is persisted, under [`TOKEN_KEY`].

use super::ClientError;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key the session token is stored under
pub const TOKEN_KEY: &str = "access_token";

/// Local persistent storage for the session token
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Option<String>;

    fn save(&mut self, token: &str) -> Result<(), ClientError>;

    fn clear(&mut self) -> Result<(), ClientError>;
}

/// Non-persistent storage, for tests and ephemeral sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStorage {
    token: Option<String>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Option<String> {
        self.token.clone()
    }

    fn save(&mut self, token: &str) -> Result<(), ClientError> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        self.token = None;
        Ok(())
    }
}

/// JSON key/value document on disk
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>, ClientError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_document(&self, document: &BTreeMap<String, String>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(document)?)?;
        Ok(())
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Option<String> {
        match self.read_document() {
            Ok(mut document) => document.remove(TOKEN_KEY),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Unreadable token storage: {}", e);
                None
            }
        }
    }

    fn save(&mut self, token: &str) -> Result<(), ClientError> {
        let mut document = self.read_document().unwrap_or_default();
        document.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_document(&document)
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        let mut document = self.read_document().unwrap_or_default();
        if document.remove(TOKEN_KEY).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.write_document(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryTokenStorage::new();
        assert_eq!(storage.load(), None);

        storage.save("abc").unwrap();
        assert_eq!(storage.load().as_deref(), Some("abc"));

        storage.clear().unwrap();
        assert_eq!(storage.load(), None);
    }

    #[test]
    fn test_file_storage_persists_under_fixed_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut storage = FileTokenStorage::new(&path);
        assert_eq!(storage.load(), None);

        storage.save("abc.def.ghi").unwrap();

        let raw: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get(TOKEN_KEY).map(String::as_str), Some("abc.def.ghi"));

        // A fresh handle sees the persisted token
        let reopened = FileTokenStorage::new(&path);
        assert_eq!(reopened.load().as_deref(), Some("abc.def.ghi"));

        storage.clear().unwrap();
        assert_eq!(FileTokenStorage::new(&path).load(), None);
    }

    #[test]
    fn test_file_storage_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let mut storage = FileTokenStorage::new(&path);
        storage.save("token").unwrap();
        storage.clear().unwrap();

        let raw: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("theme").map(String::as_str), Some("dark"));
        assert!(!raw.contains_key(TOKEN_KEY));
    }

    #[test]
    fn test_corrupt_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        assert_eq!(FileTokenStorage::new(&path).load(), None);
    }
}
