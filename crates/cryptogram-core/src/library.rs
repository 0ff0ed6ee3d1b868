//! Saved cryptograms and the store they live in.
//!
//! The core only knows the record shape and a load/save collaborator; the
//! terminal app supplies a file-backed store, tests use [`MemoryStore`].

use crate::{CipherKey, CipherMode, Result, Session};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Characters of the source text kept in a record title
pub const TITLE_CHARS: usize = 20;

/// A puzzle as kept in the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCryptogram {
    pub id: String,
    pub title: String,
    pub original_text: String,
    pub cipher_key: CipherKey,
    pub mode: CipherMode,
    #[serde(default)]
    pub tilde_assistant: bool,
    /// Unix time in milliseconds
    pub created_at: u64,
}

impl SavedCryptogram {
    /// Record for `text` created at `created_at` (millis). The id is the
    /// creation time.
    pub fn new(
        text: &str,
        cipher_key: CipherKey,
        mode: CipherMode,
        tilde_assistant: bool,
        created_at: u64,
    ) -> Self {
        Self {
            id: created_at.to_string(),
            title: title_for(text),
            original_text: text.to_string(),
            cipher_key,
            mode,
            tilde_assistant,
            created_at,
        }
    }

    /// Record stamped with the current time
    pub fn now(text: &str, cipher_key: CipherKey, mode: CipherMode, tilde_assistant: bool) -> Self {
        Self::new(text, cipher_key, mode, tilde_assistant, now_millis())
    }

    /// Fresh solving session for this record
    pub fn start_session(&self) -> Session {
        Session::new(&self.original_text, self.cipher_key.clone(), self.mode)
            .with_tilde_assistant(self.tilde_assistant)
    }
}

/// First [`TITLE_CHARS`] characters, with `...` when the text is longer
pub fn title_for(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TITLE_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Decode a stored library. Malformed data yields an empty library.
pub fn decode_library(json: &str) -> Vec<SavedCryptogram> {
    if json.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str(json) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "discarding unreadable library");
            Vec::new()
        }
    }
}

/// Encode a library the way [`decode_library`] reads it
pub fn encode_library(items: &[SavedCryptogram]) -> Result<String> {
    serde_json::to_string_pretty(items).map_err(|e| crate::CryptogramError::Decode(e.to_string()))
}

/// Load/save collaborator for the library
pub trait LibraryStore: Send + Sync {
    /// Every saved record, newest first
    fn load(&self) -> Result<Vec<SavedCryptogram>>;

    /// Replace the stored records
    fn save(&self, items: &[SavedCryptogram]) -> Result<()>;

    /// Whether the user already confirmed the local-storage notice
    fn warning_acknowledged(&self) -> bool;

    fn acknowledge_warning(&self) -> Result<()>;

    /// Store name for display
    fn backend_name(&self) -> &'static str;
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<Vec<SavedCryptogram>>,
    acknowledged: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn count(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }
}

impl LibraryStore for MemoryStore {
    fn load(&self) -> Result<Vec<SavedCryptogram>> {
        self.items
            .lock()
            .map(|items| items.clone())
            .map_err(|e| crate::CryptogramError::Storage(e.to_string()))
    }

    fn save(&self, items: &[SavedCryptogram]) -> Result<()> {
        let mut stored = self
            .items
            .lock()
            .map_err(|e| crate::CryptogramError::Storage(e.to_string()))?;
        *stored = items.to_vec();
        Ok(())
    }

    fn warning_acknowledged(&self) -> bool {
        self.acknowledged.lock().map(|a| *a).unwrap_or(false)
    }

    fn acknowledge_warning(&self) -> Result<()> {
        let mut acknowledged = self
            .acknowledged
            .lock()
            .map_err(|e| crate::CryptogramError::Storage(e.to_string()))?;
        *acknowledged = true;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

/// Saved cryptograms plus the store backing them
pub struct Library {
    store: Arc<dyn LibraryStore>,
    items: Vec<SavedCryptogram>,
}

impl Library {
    /// Open the library. A store that cannot be read starts empty.
    pub fn open(store: Arc<dyn LibraryStore>) -> Self {
        let items = store.load().unwrap_or_else(|e| {
            warn!(backend = store.backend_name(), error = %e, "library unavailable");
            Vec::new()
        });
        Self { store, items }
    }

    /// Records, newest first
    pub fn items(&self) -> &[SavedCryptogram] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SavedCryptogram> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether saving should first show the storage notice
    pub fn needs_warning(&self) -> bool {
        !self.store.warning_acknowledged()
    }

    /// Remember that the storage notice was confirmed
    pub fn acknowledge_warning(&self) -> Result<()> {
        self.store.acknowledge_warning()
    }

    /// Put `item` at the front and persist. The in-memory list keeps the
    /// record even when the store write fails.
    pub fn add(&mut self, item: SavedCryptogram) -> Result<()> {
        info!(id = %item.id, title = %item.title, "saving cryptogram");
        self.items.insert(0, item);
        self.store.save(&self.items)
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("backend", &self.store.backend_name())
            .field("items", &self.items.len())
            .finish()
    }
}
