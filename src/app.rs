// User actions over the note store, with failures routed to an alert sink

use crate::alert::{Action, Alert, AlertSink, TracingAlertSink};
use crate::clock::{Clock, Locale, SystemClock};
use crate::editor::{ComposeMode, Editor};
use crate::error::{NoteError, NoteResult};
use crate::kv::KeyValueStore;
use crate::note::{self, Note};
use crate::store::NoteStore;
use tracing::error;

/// One screen's worth of state: the displayed list, the editor, and the store
pub struct NotesApp<K, C = SystemClock, A = TracingAlertSink> {
    store: NoteStore<K, C>,
    editor: Editor,
    alerts: A,
    notes: Vec<Note>,
}

impl<K, C, A> NotesApp<K, C, A>
where
    K: KeyValueStore,
    C: Clock,
    A: AlertSink,
{
    pub fn new(store: NoteStore<K, C>, alerts: A) -> Self {
        Self {
            store,
            editor: Editor::new(),
            alerts,
            notes: Vec::new(),
        }
    }

    pub fn store(&self) -> &NoteStore<K, C> {
        &self.store
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    fn locale(&self) -> Locale {
        self.store.config().locale
    }

    /// Notes as last committed, newest first
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Count line, e.g. `2 anotações`
    pub fn header(&self) -> String {
        note::count_label(self.notes.len(), self.locale())
    }

    pub fn empty_message(&self) -> &'static str {
        note::empty_message(self.locale())
    }

    pub fn save_label(&self) -> &'static str {
        self.editor.save_label(self.locale(), false)
    }

    /// Initial load; on failure the list stays empty and the user is alerted
    pub async fn start(&mut self) -> NoteResult<&[Note]> {
        match self.store.load().await {
            Ok(notes) => {
                self.notes = notes;
                self.forget_missing_target();
                Ok(&self.notes)
            }
            Err(e) => {
                self.notes.clear();
                self.forget_missing_target();
                Err(self.report(e, Action::Load))
            }
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.editor.set_text(text);
    }

    /// Create or update, depending on whether a note is selected
    pub async fn save(&mut self) -> NoteResult<&[Note]> {
        match self.editor.save(&self.store).await {
            Ok(notes) => {
                self.notes = notes;
                Ok(&self.notes)
            }
            Err(e) => Err(self.report(e, Action::Save)),
        }
    }

    /// Pick a note for editing
    pub fn select(&mut self, id: &str) -> NoteResult<()> {
        match self.notes.iter().find(|n| n.id == id) {
            Some(note) => {
                self.editor.begin_edit(note);
                Ok(())
            }
            None => Err(self.report(NoteError::NotFound(id.to_string()), Action::Save)),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editor.cancel();
    }

    pub async fn delete(&mut self, id: &str) -> NoteResult<&[Note]> {
        match self.store.delete(id).await {
            Ok(notes) => {
                self.notes = notes;
                self.editor.forget(id);
                Ok(&self.notes)
            }
            Err(e) => Err(self.report(e, Action::Delete)),
        }
    }

    pub async fn clear_all(&mut self) -> NoteResult<&[Note]> {
        match self.store.clear_all().await {
            Ok(notes) => {
                self.notes = notes;
                self.forget_missing_target();
                Ok(&self.notes)
            }
            Err(e) => Err(self.report(e, Action::Clear)),
        }
    }

    /// Drop an edit target that is no longer in the displayed list
    fn forget_missing_target(&mut self) {
        if let ComposeMode::Editing(id) = self.editor.mode().clone() {
            if !self.notes.iter().any(|n| n.id == id) {
                self.editor.forget(&id);
            }
        }
    }

    /// Log the cause, alert the user, hand the error back
    fn report(&self, e: NoteError, action: Action) -> NoteError {
        error!(?action, error = %e, "Note operation failed");
        self.alerts.alert(&Alert::for_error(&e, action, self.locale()));
        e
    }
}
