// Note store: in-memory note list mirrored write-through to a key-value store

use crate::clock::{Clock, SystemClock, millis};
use crate::config::{StoreConfig, UnknownIdPolicy};
use crate::error::{NoteError, NoteResult};
use crate::kv::KeyValueStore;
use crate::note::{Note, is_blank};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Sole owner of the note list
///
/// The list is newest-first. Every mutation builds the next list from the
/// committed one, writes the whole list under the configured key, and only
/// then commits it; a failed write leaves the committed list untouched.
/// Operations hold the list lock across the storage call, so concurrent
/// callers are serialized and cannot lose each other's updates.
pub struct NoteStore<K, C = SystemClock> {
    kv: K,
    clock: C,
    config: StoreConfig,
    notes: Mutex<Vec<Note>>,
}

impl<K: KeyValueStore, C: Clock> NoteStore<K, C> {
    /// Create a store with an empty list; call `load()` to read persisted notes
    pub fn new(kv: K, clock: C, config: StoreConfig) -> Self {
        Self {
            kv,
            clock,
            config,
            notes: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The underlying key-value store
    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Snapshot of the committed list
    pub async fn notes(&self) -> Vec<Note> {
        self.notes.lock().await.clone()
    }

    /// Get a note by ID
    pub async fn get(&self, id: &str) -> Option<Note> {
        self.notes.lock().await.iter().find(|n| n.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.notes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notes.lock().await.is_empty()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// Replace the in-memory list with the persisted one
    ///
    /// An absent key is an empty list. A read or decode failure also leaves
    /// the in-memory list empty and is returned to the caller.
    pub async fn load(&self) -> NoteResult<Vec<Note>> {
        let mut notes = self.notes.lock().await;
        let key = self.config.key.as_str();
        debug!(key, "load: called");

        let bytes = match self.kv.get(key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(key, error = %e, "Failed to read notes");
                notes.clear();
                return Err(e.into());
            }
        };

        let loaded = match bytes {
            None => {
                debug!(key, "No stored notes, starting empty");
                Vec::new()
            }
            Some(bytes) => match serde_json::from_slice::<Vec<Note>>(&bytes) {
                Ok(list) => list,
                Err(e) => {
                    warn!(key, error = %e, bytes = bytes.len(), "Stored notes are unreadable, starting empty");
                    notes.clear();
                    if self.config.preserve_corrupt {
                        self.preserve_corrupt(bytes).await;
                    }
                    return Err(NoteError::Decode(e));
                }
            },
        };

        *notes = loaded.clone();
        info!(key, count = loaded.len(), "Loaded notes");
        Ok(loaded)
    }

    async fn preserve_corrupt(&self, bytes: Vec<u8>) {
        let backup_key = self.config.corrupt_key();
        match self.kv.set(&backup_key, bytes).await {
            Ok(()) => info!(key = %backup_key, "Preserved unreadable notes"),
            Err(e) => error!(key = %backup_key, error = %e, "Failed to preserve unreadable notes"),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a new note at the head of the list
    pub async fn create(&self, text: &str) -> NoteResult<Vec<Note>> {
        Self::validate_text(text)?;

        let mut notes = self.notes.lock().await;
        let now = self.clock.now();
        let created_at_millis = millis(&now);
        let locale = self.config.locale;

        let note = Note {
            id: Self::unique_id(&notes, created_at_millis),
            text: text.to_string(),
            created_date: locale.format_date(&now),
            created_time: locale.format_time(&now),
            created_at_millis,
        };
        debug!(id = %note.id, "create: called");

        let mut next = Vec::with_capacity(notes.len() + 1);
        next.push(note);
        next.extend(notes.iter().cloned());

        self.persist(&next).await?;
        *notes = next.clone();
        info!(id = %next[0].id, count = next.len(), "Created note");
        Ok(next)
    }

    /// Replace the text of an existing note, keeping its position and metadata
    pub async fn update(&self, id: &str, text: &str) -> NoteResult<Vec<Note>> {
        Self::validate_text(text)?;

        let mut notes = self.notes.lock().await;
        debug!(id, "update: called");

        let Some(index) = notes.iter().position(|n| n.id == id) else {
            return match self.config.unknown_update {
                UnknownIdPolicy::Ignore => {
                    debug!(id, "update: unknown id, ignoring");
                    Ok(notes.clone())
                }
                UnknownIdPolicy::Reject => Err(NoteError::NotFound(id.to_string())),
            };
        };

        let mut next = notes.clone();
        next[index].text = text.to_string();

        self.persist(&next).await?;
        *notes = next.clone();
        info!(id, count = next.len(), "Updated note");
        Ok(next)
    }

    /// Remove a note; an unknown id is a no-op
    pub async fn delete(&self, id: &str) -> NoteResult<Vec<Note>> {
        let mut notes = self.notes.lock().await;
        debug!(id, "delete: called");

        if !notes.iter().any(|n| n.id == id) {
            debug!(id, "delete: unknown id, nothing to do");
            return Ok(notes.clone());
        }

        let next: Vec<Note> = notes.iter().filter(|n| n.id != id).cloned().collect();

        self.persist(&next).await?;
        *notes = next.clone();
        info!(id, count = next.len(), "Deleted note");
        Ok(next)
    }

    /// Delete the storage key and empty the list
    pub async fn clear_all(&self) -> NoteResult<Vec<Note>> {
        let mut notes = self.notes.lock().await;
        let key = self.config.key.as_str();
        debug!(key, count = notes.len(), "clear_all: called");

        if let Err(e) = self.kv.remove(key).await {
            error!(key, error = %e, "Failed to clear notes");
            return Err(e.into());
        }

        notes.clear();
        info!(key, "Cleared all notes");
        Ok(Vec::new())
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Serialize the whole list and write it under the configured key
    async fn persist(&self, next: &[Note]) -> NoteResult<()> {
        let key = self.config.key.as_str();
        let bytes = serde_json::to_vec(next).map_err(NoteError::Encode)?;

        if let Err(e) = self.kv.set(key, bytes).await {
            error!(key, error = %e, "Failed to persist notes");
            return Err(e.into());
        }
        Ok(())
    }

    fn validate_text(text: &str) -> NoteResult<()> {
        if is_blank(text) {
            return Err(NoteError::Validation);
        }
        Ok(())
    }

    /// Millisecond timestamp as id, bumped past any id already in use
    fn unique_id(notes: &[Note], created_at_millis: i64) -> String {
        let mut candidate = created_at_millis;
        loop {
            let id = candidate.to_string();
            if !notes.iter().any(|n| n.id == id) {
                return id;
            }
            candidate += 1;
        }
    }
}
