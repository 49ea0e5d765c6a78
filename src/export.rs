//! CSV export for batch use.
//!
//! The format is a fixed four-column table — `Question, Answer, Tags, Type`
//! — one row per flashcard, tags joined with `", "`. Fields are quoted
//! RFC-4180 style when they contain a comma, quote, or newline. The write
//! is atomic (temp file + rename) so readers never observe a partial file.

use crate::error::FlashgenError;
use crate::output::Flashcard;
use std::path::Path;

/// CSV header row.
pub const CSV_HEADER: &str = "Question,Answer,Tags,Type";

/// Render flashcards as a CSV document, header included.
pub fn to_csv(cards: &[Flashcard]) -> String {
    let mut out = String::with_capacity(cards.len() * 64 + CSV_HEADER.len() + 1);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for card in cards {
        out.push_str(&csv_field(&card.question));
        out.push(',');
        out.push_str(&csv_field(&card.answer));
        out.push(',');
        out.push_str(&csv_field(&card.tags.join(", ")));
        out.push(',');
        out.push_str(&csv_field(&card.card_type));
        out.push('\n');
    }
    out
}

/// Write flashcards to a CSV file, creating parent directories.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_csv(cards: &[Flashcard], path: impl AsRef<Path>) -> Result<(), FlashgenError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FlashgenError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = path.with_extension("csv.tmp");
    tokio::fs::write(&tmp_path, to_csv(cards))
        .await
        .map_err(|e| FlashgenError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| FlashgenError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Quote a field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(q: &str, a: &str, tags: &[&str]) -> Flashcard {
        Flashcard {
            question: q.to_string(),
            answer: a.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            card_type: "Standard".to_string(),
        }
    }

    #[test]
    fn header_and_rows() {
        let csv = to_csv(&[card("Q1", "A1", &["Biology"])]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Question,Answer,Tags,Type"));
        assert_eq!(lines.next(), Some("Q1,A1,Biology,Standard"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn tags_joined_with_comma_space_and_quoted() {
        let csv = to_csv(&[card("Q", "A", &["Biology", "Cell Structure"])]);
        assert!(csv.contains("\"Biology, Cell Structure\""));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let csv = to_csv(&[card("What is a \"closure\"?", "A function", &[])]);
        assert!(csv.contains("\"What is a \"\"closure\"\"?\""));
    }

    #[test]
    fn newlines_in_answers_are_quoted() {
        let csv = to_csv(&[card("Q", "line one\nline two", &[])]);
        assert!(csv.contains("\"line one\nline two\""));
    }

    #[tokio::test]
    async fn write_csv_creates_parents_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        write_csv(&[card("Q", "A", &[])], &path).await.unwrap();
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.starts_with("Question,Answer,Tags,Type\n"));
        assert!(content.contains("Q,A,,Standard"));
    }
}
