//! Library store backends
//!
//! - Local: JSON file in the data directory, replaced atomically on save
//! - Test: in-memory store from the core crate

use crate::config::{Config, Environment};
use cryptogram_core::library::{decode_library, encode_library};
use cryptogram_core::{CryptogramError, LibraryStore, MemoryStore, Result, SavedCryptogram};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tracing::debug;

/// File-backed library
pub struct FileLibrary {
    path: PathBuf,
    notice_path: PathBuf,
    cache: Mutex<Option<Vec<SavedCryptogram>>>,
}

impl FileLibrary {
    pub fn new(path: impl Into<PathBuf>, notice_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            notice_path: notice_path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_cache(&self) -> Result<std::sync::MutexGuard<'_, Option<Vec<SavedCryptogram>>>> {
        self.cache
            .lock()
            .map_err(|e| CryptogramError::Storage(e.to_string()))
    }
}

impl LibraryStore for FileLibrary {
    fn load(&self) -> Result<Vec<SavedCryptogram>> {
        let mut cache = self.lock_cache()?;
        if let Some(ref items) = *cache {
            return Ok(items.clone());
        }

        let items = match fs::read_to_string(&self.path) {
            Ok(json) => decode_library(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(CryptogramError::Storage(e.to_string())),
        };
        debug!(path = %self.path.display(), items = items.len(), "library loaded");

        *cache = Some(items.clone());
        Ok(items)
    }

    fn save(&self, items: &[SavedCryptogram]) -> Result<()> {
        let json = encode_library(items)?;
        write_atomic(&self.path, json.as_bytes())
            .map_err(|e| CryptogramError::Storage(e.to_string()))?;

        *self.lock_cache()? = Some(items.to_vec());
        Ok(())
    }

    fn warning_acknowledged(&self) -> bool {
        self.notice_path.exists()
    }

    fn acknowledge_warning(&self) -> Result<()> {
        write_atomic(&self.notice_path, b"true")
            .map_err(|e| CryptogramError::Storage(e.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "Local"
    }
}

/// Write `contents` to a temp file next to `path`, then rename it over `path`
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let mut temp_file = NamedTempFile::new_in(parent_dir)?;
    temp_file.write_all(contents)?;
    temp_file.flush()?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create the appropriate store for the environment
pub fn create_store(config: &Config) -> Arc<dyn LibraryStore> {
    match config.env {
        Environment::Local => Arc::new(FileLibrary::new(
            config.library_path(),
            config.notice_path(),
        )),
        Environment::Test => Arc::new(MemoryStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptogram_core::{CipherMode, KeyGenerator, Library};

    fn record(text: &str, at: u64) -> SavedCryptogram {
        let key = KeyGenerator::with_seed(at).generate(CipherMode::Symbols);
        SavedCryptogram::new(text, key, CipherMode::Symbols, false, at)
    }

    fn store_in(dir: &Path) -> FileLibrary {
        FileLibrary::new(dir.join("library.json"), dir.join("notice"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.load().unwrap().is_empty());
        assert!(!store.warning_acknowledged());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let items = vec![record("dos", 2), record("uno", 1)];
        store_in(dir.path()).save(&items).unwrap();

        // A fresh store reads what the first one wrote
        let reloaded = store_in(dir.path()).load().unwrap();
        assert_eq!(reloaded, items);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("library.json"), "[{\"broken\":").unwrap();
        let library = Library::open(Arc::new(store_in(dir.path())));
        assert!(library.is_empty());
    }

    #[test]
    fn test_save_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = store_in(&nested);
        store.save(&[record("hola", 5)]).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_notice_acknowledgement_persists() {
        let dir = tempfile::tempdir().unwrap();
        store_in(dir.path()).acknowledge_warning().unwrap();
        assert!(store_in(dir.path()).warning_acknowledged());
    }

    #[test]
    fn test_create_store_by_environment() {
        let dir = tempfile::tempdir().unwrap();
        let local = create_store(&Config::for_dir(dir.path(), Environment::Local));
        assert_eq!(local.backend_name(), "Local");
        let test = create_store(&Config::for_dir(dir.path(), Environment::Test));
        assert_eq!(test.backend_name(), "Memory");
    }
}
