// User-facing alerts for failed operations

use crate::clock::Locale;
use crate::error::NoteError;
use std::sync::Mutex;
use tracing::warn;

/// What the user was trying to do when an error happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Save,
    Delete,
    Clear,
    Load,
}

/// A blocking message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    /// Translate an error into the message for `action`
    ///
    /// Storage and decode causes are not shown; the caller logs them.
    pub fn for_error(error: &NoteError, action: Action, locale: Locale) -> Self {
        let message = match (error, locale) {
            (NoteError::Validation, Locale::PtBr) => "A anotação não pode estar vazia.",
            (NoteError::Validation, Locale::EnUs) => "The note cannot be empty.",
            (NoteError::NotFound(_), Locale::PtBr) => "Anotação não encontrada.",
            (NoteError::NotFound(_), Locale::EnUs) => "Note not found.",
            (_, locale) => failure_message(action, locale),
        };
        Self {
            title: title(locale).to_string(),
            message: message.to_string(),
        }
    }
}

fn title(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Erro",
        Locale::EnUs => "Error",
    }
}

fn failure_message(action: Action, locale: Locale) -> &'static str {
    match (action, locale) {
        (Action::Save, Locale::PtBr) => "Não foi possível salvar a anotação.",
        (Action::Save, Locale::EnUs) => "Could not save the note.",
        (Action::Delete, Locale::PtBr) => "Não foi possível excluir a anotação.",
        (Action::Delete, Locale::EnUs) => "Could not delete the note.",
        (Action::Clear, Locale::PtBr) => "Não foi possível limpar as anotações.",
        (Action::Clear, Locale::EnUs) => "Could not clear the notes.",
        (Action::Load, Locale::PtBr) => "Não foi possível carregar as anotações.",
        (Action::Load, Locale::EnUs) => "Could not load the notes.",
    }
}

/// Receives alerts for failures; never called on success
pub trait AlertSink: Send + Sync {
    fn alert(&self, alert: &Alert);
}

/// Sink that only logs
#[derive(Debug, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn alert(&self, alert: &Alert) {
        warn!(title = %alert.title, message = %alert.message, "Alert");
    }
}

/// Sink that keeps every alert it receives
#[derive(Debug, Default)]
pub struct RecordingAlertSink {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<Alert> {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner()).last().cloned()
    }
}

impl AlertSink for RecordingAlertSink {
    fn alert(&self, alert: &Alert) {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner()).push(alert.clone());
    }
}

impl<S: AlertSink + ?Sized> AlertSink for std::sync::Arc<S> {
    fn alert(&self, alert: &Alert) {
        (**self).alert(alert)
    }
}
