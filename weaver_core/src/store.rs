//! Key-value document store used for persistence.
//!
//! The writing tool keeps four documents, each a complete JSON value under a
//! fixed key. Writers always replace the whole document; there are no
//! field-level updates.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use weaver_model::{Character, Relationship, Story, StoryLibrary};

use crate::error::{Result, WeaverError};

/// Key of the character list.
pub const CHARACTERS_KEY: &str = "characters";

/// Key of the story list.
pub const STORIES_KEY: &str = "stories";

/// Key of the relationship list.
pub const RELATIONSHIPS_KEY: &str = "relationships";

/// Key of the learning document.
pub const LEARNING_DATA_KEY: &str = "ml_learning_data";

/// String-valued key-value store holding whole JSON documents.
pub trait DocumentStore {
    /// Read the document stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document stored under `key`.
    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete the document stored under `key`. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-process store, used by tests and embedders that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<String, String>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a document exists.
    pub fn contains(&self, key: &str) -> bool {
        self.documents.contains_key(key)
    }

    /// Get the number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.documents.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.documents.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.documents.remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per document.
///
/// Writes go to a temporary file in the same directory that is then renamed
/// over the target, so readers see either the old or the new document.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(WeaverError::store(key, "keys may only contain [A-Za-z0-9_-]"));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl DocumentStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let mut file = NamedTempFile::new_in(&self.root)?;
        file.write_all(value.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Read a JSON list, substituting an empty list when it is missing,
/// unreadable, or malformed.
pub fn load_collection<T: DeserializeOwned>(store: &dyn DocumentStore, key: &str) -> Vec<T> {
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read '{}', using empty list: {}", key, e);
            return Vec::new();
        }
    };

    match serde_json::from_str(&text) {
        Ok(items) => items,
        Err(e) => {
            warn!("Malformed '{}' document, using empty list: {}", key, e);
            Vec::new()
        }
    }
}

/// Replace a JSON list in the store.
pub fn save_collection<T: Serialize>(
    store: &mut dyn DocumentStore,
    key: &str,
    items: &[T],
) -> Result<()> {
    let text = serde_json::to_string(items)?;
    store.put(key, &text)?;
    debug!("Saved {} entries to '{}'", items.len(), key);
    Ok(())
}

/// Load the stored stories.
pub fn load_stories(store: &dyn DocumentStore) -> Vec<Story> {
    load_collection(store, STORIES_KEY)
}

/// Load the stored characters.
pub fn load_characters(store: &dyn DocumentStore) -> Vec<Character> {
    load_collection(store, CHARACTERS_KEY)
}

/// Load the stored relationships.
pub fn load_relationships(store: &dyn DocumentStore) -> Vec<Relationship> {
    load_collection(store, RELATIONSHIPS_KEY)
}

/// Load all three library documents.
pub fn load_library(store: &dyn DocumentStore) -> StoryLibrary {
    StoryLibrary {
        stories: load_stories(store),
        characters: load_characters(store),
        relationships: load_relationships(store),
    }
}
