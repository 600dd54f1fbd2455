// NoteStore - Local note list kept write-through in a key-value store

pub mod alert;
pub mod app;
pub mod clock;
pub mod config;
pub mod editor;
pub mod error;
pub mod kv;
pub mod note;
pub mod store;

// Re-export main types for convenience
pub use alert::{Action, Alert, AlertSink, RecordingAlertSink, TracingAlertSink};
pub use app::NotesApp;
pub use clock::{Clock, FixedClock, Locale, SystemClock};
pub use config::{Config, StoreConfig, UnknownIdPolicy};
pub use editor::{ComposeMode, Editor};
pub use error::{NoteError, NoteResult};
pub use kv::{FileKv, KeyValueStore, KvError, MemoryKv};
pub use note::Note;
pub use store::NoteStore;
