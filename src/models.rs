//! Domain models for the bookshelf. These types stay light-weight data holders
//! so the repository and the UI can pass them around freely. The serde shape of
//! `BookRecord` is the persisted payload format, so renaming a field here is a
//! storage format change.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single book on the shelf.
pub struct BookRecord {
    /// Millisecond epoch timestamp assigned at creation. Never changes.
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Publication year. Older payloads stored this as text, or as `null` when
    /// the year was left blank; both are still accepted on load.
    #[serde(default, deserialize_with = "year_from_number_or_text")]
    pub year: i32,
    /// Whether the book has been read. Decides which category view it lands in.
    #[serde(rename = "isComplete")]
    pub is_complete: bool,
}

impl BookRecord {
    /// Category view this record belongs to.
    pub fn category(&self) -> Category {
        if self.is_complete {
            Category::Complete
        } else {
            Category::Incomplete
        }
    }

    /// Case-insensitive title match. A blank query matches everything.
    pub fn matches_title(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty() || self.title.to_lowercase().contains(&needle)
    }

    pub fn author_line(&self) -> String {
        format!("Author: {}", self.author)
    }

    pub fn year_line(&self) -> String {
        format!("Year: {}", self.year)
    }
}

impl fmt::Display for BookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.year)
    }
}

/// The two display groups a record can belong to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Category {
    Incomplete,
    Complete,
}

impl Category {
    /// Pane title used by the terminal front-end.
    pub fn heading(self) -> &'static str {
        match self {
            Category::Incomplete => "Unread",
            Category::Complete => "Read",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Category::Incomplete => Category::Complete,
            Category::Complete => Category::Incomplete,
        }
    }
}

/// Raw, unvalidated input captured by the entry form. The year is still text
/// here because that is what the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub year: String,
    pub is_complete: bool,
}

impl BookDraft {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl Into<String>,
        is_complete: bool,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: year.into(),
            is_complete,
        }
    }
}

/// Partial replacement of a record's fields. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub is_complete: Option<bool>,
}

impl BookUpdate {
    /// Replace every editable field at once, as the edit form does.
    pub fn replace_all(title: String, author: String, year: i32, is_complete: bool) -> Self {
        Self {
            title: Some(title),
            author: Some(author),
            year: Some(year),
            is_complete: Some(is_complete),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YearRepr {
    Number(i64),
    Text(String),
}

fn year_from_number_or_text<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    // A blank year was stored as `null`; it reads back as year 0.
    match Option::<YearRepr>::deserialize(deserializer)? {
        None => Ok(0),
        Some(YearRepr::Number(n)) => i32::try_from(n).map_err(D::Error::custom),
        Some(YearRepr::Text(text)) if text.trim().is_empty() => Ok(0),
        Some(YearRepr::Text(text)) => text
            .trim()
            .parse::<i32>()
            .map_err(|_| D::Error::custom(format!("invalid year `{text}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> BookRecord {
        BookRecord {
            id: 1,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            year: 1965,
            is_complete: false,
        }
    }

    #[test]
    fn payload_uses_is_complete_key() {
        let json = serde_json::to_string(&dune()).unwrap();
        assert!(json.contains("\"isComplete\":false"));
        assert!(json.contains("\"year\":1965"));
    }

    #[test]
    fn text_year_is_accepted_on_load() {
        let json = r#"{"id":7,"title":"Emma","author":"Austen","year":"1815","isComplete":true}"#;
        let record: BookRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.year, 1815);
        assert_eq!(record.category(), Category::Complete);
    }

    #[test]
    fn blank_year_reads_as_zero() {
        let null_year = r#"{"id":7,"title":"Emma","author":"Austen","year":null,"isComplete":false}"#;
        let no_year = r#"{"id":8,"title":"Emma","author":"Austen","isComplete":false}"#;
        assert_eq!(serde_json::from_str::<BookRecord>(null_year).unwrap().year, 0);
        assert_eq!(serde_json::from_str::<BookRecord>(no_year).unwrap().year, 0);
    }

    #[test]
    fn garbage_year_is_rejected() {
        let json = r#"{"id":7,"title":"Emma","author":"Austen","year":"soon","isComplete":true}"#;
        assert!(serde_json::from_str::<BookRecord>(json).is_err());
    }

    #[test]
    fn title_match_ignores_case_and_blank_query() {
        let record = dune();
        assert!(record.matches_title("dUN"));
        assert!(record.matches_title("   "));
        assert!(!record.matches_title("herbert"));
    }

    #[test]
    fn display_lines() {
        let record = dune();
        assert_eq!(record.author_line(), "Author: Frank Herbert");
        assert_eq!(record.year_line(), "Year: 1965");
    }
}
