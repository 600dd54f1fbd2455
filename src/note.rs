// Note entity and list display helpers

use crate::clock::Locale;
use serde::{Deserialize, Serialize};

/// A single user-authored text entry with its creation metadata
///
/// Field names on the wire are the persisted contract:
/// `{id, texto, data, hora, timestamp}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Creation timestamp in milliseconds, rendered as a string
    pub id: String,
    #[serde(rename = "texto")]
    pub text: String,
    /// Locale-formatted creation date
    #[serde(rename = "data")]
    pub created_date: String,
    /// Locale-formatted creation time
    #[serde(rename = "hora")]
    pub created_time: String,
    #[serde(rename = "timestamp")]
    pub created_at_millis: i64,
}

impl Note {
    /// Header line shown above the note body, e.g. `17/10/2026 - 14:05:09`
    pub fn stamp(&self) -> String {
        format!("{} - {}", self.created_date, self.created_time)
    }
}

/// True when text has something besides whitespace
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Note count with the right plural, e.g. `1 anotação`, `3 anotações`
pub fn count_label(count: usize, locale: Locale) -> String {
    let noun = match (locale, count == 1) {
        (Locale::PtBr, true) => "anotação",
        (Locale::PtBr, false) => "anotações",
        (Locale::EnUs, true) => "note",
        (Locale::EnUs, false) => "notes",
    };
    format!("{} {}", count, noun)
}

/// Placeholder shown when there are no notes
pub fn empty_message(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Nenhuma anotação salva ainda.",
        Locale::EnUs => "No notes saved yet.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Note {
        Note {
            id: "1792256709123".to_string(),
            text: "Buy milk".to_string(),
            created_date: "17/10/2026".to_string(),
            created_time: "14:05:09".to_string(),
            created_at_millis: 1_792_256_709_123,
        }
    }

    #[test]
    fn test_note_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["id"], "1792256709123");
        assert_eq!(json["texto"], "Buy milk");
        assert_eq!(json["data"], "17/10/2026");
        assert_eq!(json["hora"], "14:05:09");
        assert_eq!(json["timestamp"], 1_792_256_709_123i64);
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_note_decodes_stored_blob() {
        let blob = r#"[{"id":"1","texto":"a","data":"01/01/2025","hora":"08:00:00","timestamp":1,"extra":true}]"#;
        let notes: Vec<Note> = serde_json::from_str(blob).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].text, "a");
        assert_eq!(notes[0].created_at_millis, 1);
    }

    #[test]
    fn test_stamp() {
        assert_eq!(sample().stamp(), "17/10/2026 - 14:05:09");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("  \n\t"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn test_count_label_pluralization() {
        assert_eq!(count_label(0, Locale::PtBr), "0 anotações");
        assert_eq!(count_label(1, Locale::PtBr), "1 anotação");
        assert_eq!(count_label(2, Locale::PtBr), "2 anotações");
        assert_eq!(count_label(1, Locale::EnUs), "1 note");
        assert_eq!(count_label(5, Locale::EnUs), "5 notes");
    }

    #[test]
    fn test_empty_message() {
        assert_eq!(empty_message(Locale::PtBr), "Nenhuma anotação salva ainda.");
        assert_eq!(empty_message(Locale::EnUs), "No notes saved yet.");
    }
}
