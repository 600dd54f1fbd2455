// Compose state: decides whether a save creates or updates

use crate::clock::{Clock, Locale};
use crate::error::NoteResult;
use crate::kv::KeyValueStore;
use crate::note::{Note, is_blank};
use crate::store::NoteStore;
use tracing::debug;

/// Which operation the next save performs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ComposeMode {
    /// Save creates a new note
    #[default]
    Composing,
    /// Save updates the note with this id
    Editing(String),
}

/// Working text plus compose mode
#[derive(Debug, Clone, Default)]
pub struct Editor {
    mode: ComposeMode,
    text: String,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &ComposeMode {
        &self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, ComposeMode::Editing(_))
    }

    /// Save is offered only for non-blank text
    pub fn can_save(&self) -> bool {
        !is_blank(&self.text)
    }

    /// Target `note` and pre-fill its text
    pub fn begin_edit(&mut self, note: &Note) {
        debug!(id = %note.id, "Editor: begin edit");
        self.mode = ComposeMode::Editing(note.id.clone());
        self.text = note.text.clone();
    }

    /// Drop the edit target and the working text
    pub fn cancel(&mut self) {
        debug!(mode = ?self.mode, "Editor: cancel");
        self.mode = ComposeMode::Composing;
        self.text.clear();
    }

    /// Stop targeting `id` if it is the note being edited, keeping the text
    pub fn forget(&mut self, id: &str) {
        if matches!(&self.mode, ComposeMode::Editing(target) if target == id) {
            debug!(id, "Editor: edit target removed");
            self.mode = ComposeMode::Composing;
        }
    }

    /// Create or update depending on the mode
    ///
    /// On success the text is cleared and the mode returns to `Composing`.
    /// On failure both are left as they were.
    pub async fn save<K, C>(&mut self, store: &NoteStore<K, C>) -> NoteResult<Vec<Note>>
    where
        K: KeyValueStore,
        C: Clock,
    {
        let notes = match &self.mode {
            ComposeMode::Composing => store.create(&self.text).await?,
            ComposeMode::Editing(id) => store.update(id, &self.text).await?,
        };

        self.mode = ComposeMode::Composing;
        self.text.clear();
        Ok(notes)
    }

    /// Caption for the save button
    pub fn save_label(&self, locale: Locale, saving: bool) -> &'static str {
        match (locale, saving, self.is_editing()) {
            (Locale::PtBr, true, _) => "Salvando...",
            (Locale::PtBr, false, true) => "Atualizar Anotação",
            (Locale::PtBr, false, false) => "Salvar Anotação",
            (Locale::EnUs, true, _) => "Saving...",
            (Locale::EnUs, false, true) => "Update Note",
            (Locale::EnUs, false, false) => "Save Note",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::StoreConfig;
    use crate::error::NoteError;
    use crate::kv::testing::FlakyKv;
    use chrono::Duration;

    fn store() -> NoteStore<FlakyKv, FixedClock> {
        NoteStore::new(
            FlakyKv::new(),
            FixedClock::from_millis(1_792_256_709_123),
            StoreConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_save_in_composing_creates() {
        let store = store();
        let mut editor = Editor::new();
        editor.set_text("first");

        let notes = editor.save(&store).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(editor.text(), "");
        assert_eq!(editor.mode(), &ComposeMode::Composing);
    }

    #[tokio::test]
    async fn test_begin_edit_prefills_text() {
        let store = store();
        let notes = store.create("original").await.unwrap();

        let mut editor = Editor::new();
        editor.begin_edit(&notes[0]);
        assert_eq!(editor.text(), "original");
        assert_eq!(editor.mode(), &ComposeMode::Editing(notes[0].id.clone()));
    }

    #[tokio::test]
    async fn test_save_in_editing_updates_never_creates() {
        let store = store();
        store.create("a").await.unwrap();
        store.clock().advance(Duration::seconds(1));
        let notes = store.create("b").await.unwrap();
        let target = notes[1].clone();

        let mut editor = Editor::new();
        editor.begin_edit(&target);

        // A failed write keeps the edit target
        store.kv().fail_writes(true);
        editor.set_text("a, edited");
        assert!(matches!(editor.save(&store).await, Err(NoteError::Persistence(_))));
        assert_eq!(editor.mode(), &ComposeMode::Editing(target.id.clone()));
        assert_eq!(editor.text(), "a, edited");
        store.kv().fail_writes(false);

        let notes = editor.save(&store).await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1].id, target.id);
        assert_eq!(notes[1].text, "a, edited");
        assert_eq!(editor.mode(), &ComposeMode::Composing);
        assert_eq!(editor.text(), "");

        // Back in composing, the next save creates
        editor.set_text("c");
        let notes = editor.save(&store).await.unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].text, "c");
    }

    #[tokio::test]
    async fn test_blank_save_keeps_state() {
        let store = store();
        let notes = store.create("x").await.unwrap();

        let mut editor = Editor::new();
        editor.begin_edit(&notes[0]);
        editor.set_text("   ");
        assert!(!editor.can_save());

        assert!(matches!(editor.save(&store).await, Err(NoteError::Validation)));
        assert!(editor.is_editing());
        assert_eq!(store.notes().await[0].text, "x");
    }

    #[test]
    fn test_cancel_returns_to_composing() {
        let note = Note {
            id: "1".to_string(),
            text: "t".to_string(),
            created_date: String::new(),
            created_time: String::new(),
            created_at_millis: 1,
        };
        let mut editor = Editor::new();
        editor.begin_edit(&note);
        editor.cancel();

        assert_eq!(editor.mode(), &ComposeMode::Composing);
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn test_forget_only_matching_target() {
        let note = Note {
            id: "42".to_string(),
            text: "t".to_string(),
            created_date: String::new(),
            created_time: String::new(),
            created_at_millis: 42,
        };
        let mut editor = Editor::new();
        editor.begin_edit(&note);

        editor.forget("7");
        assert!(editor.is_editing());

        editor.forget("42");
        assert_eq!(editor.mode(), &ComposeMode::Composing);
        assert_eq!(editor.text(), "t");
    }

    #[test]
    fn test_save_label() {
        let mut editor = Editor::new();
        assert_eq!(editor.save_label(Locale::PtBr, false), "Salvar Anotação");
        assert_eq!(editor.save_label(Locale::PtBr, true), "Salvando...");
        assert_eq!(editor.save_label(Locale::EnUs, false), "Save Note");

        editor.mode = ComposeMode::Editing("1".to_string());
        assert_eq!(editor.save_label(Locale::PtBr, false), "Atualizar Anotação");
        assert_eq!(editor.save_label(Locale::EnUs, false), "Update Note");
        assert_eq!(editor.save_label(Locale::EnUs, true), "Saving...");
    }
}
