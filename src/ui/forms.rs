use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{BookDraft, BookRecord};

/// The shared entry form. It is used both for new books and, while the binder
/// is editing, for the record being edited.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub year: String,
    pub is_complete: bool,
    pub active: BookField,
    /// Last validation message, shown in red under the fields.
    pub error: Option<String>,
}

/// Fields available within the book form, in focus order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BookField {
    #[default]
    Title,
    Author,
    Year,
    Read,
}

impl BookField {
    pub const ALL: [BookField; 4] = [
        BookField::Title,
        BookField::Author,
        BookField::Year,
        BookField::Read,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Year",
            BookField::Read => "Read",
        }
    }

    fn index(self) -> usize {
        match self {
            BookField::Title => 0,
            BookField::Author => 1,
            BookField::Year => 2,
            BookField::Read => 3,
        }
    }
}

impl BookForm {
    /// Populate the form from an existing record when entering edit mode.
    pub fn from_record(book: &BookRecord) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year.to_string(),
            is_complete: book.is_complete,
            active: BookField::Title,
            error: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_draft(&self) -> BookDraft {
        BookDraft::new(
            self.title.clone(),
            self.author.clone(),
            self.year.clone(),
            self.is_complete,
        )
    }

    pub fn next_field(&mut self) {
        let next = (self.active.index() + 1) % BookField::ALL.len();
        self.active = BookField::ALL[next];
    }

    pub fn previous_field(&mut self) {
        let len = BookField::ALL.len();
        let previous = (self.active.index() + len - 1) % len;
        self.active = BookField::ALL[previous];
    }

    /// Append a character to the active field. Returns whether the input was
    /// accepted. On the read checkbox a space toggles the flag.
    pub fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Year => {
                let leading_minus = ch == '-' && self.year.is_empty();
                if !ch.is_ascii_digit() && !leading_minus {
                    return false;
                }
                self.year.push(ch);
            }
            BookField::Read => {
                if ch != ' ' {
                    return false;
                }
                self.is_complete = !self.is_complete;
            }
        }
        true
    }

    pub fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Read => {}
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let value = match field {
            BookField::Title => self.title.clone(),
            BookField::Author => self.author.clone(),
            BookField::Year => self.year.clone(),
            BookField::Read => {
                let mark = if self.is_complete { "x" } else { " " };
                format!("[{mark}]")
            }
        };

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Character count of the requested field, used to place the cursor.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Title => self.title.chars().count(),
            BookField::Author => self.author.chars().count(),
            BookField::Year => self.year.chars().count(),
            BookField::Read => 1,
        }
    }
}

/// State for confirming a deletion.
#[derive(Debug, Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_both_ways() {
        let mut form = BookForm::default();
        form.previous_field();
        assert_eq!(form.active, BookField::Read);
        form.next_field();
        form.next_field();
        assert_eq!(form.active, BookField::Author);
    }

    #[test]
    fn year_accepts_digits_and_one_leading_minus() {
        let mut form = BookForm {
            active: BookField::Year,
            ..BookForm::default()
        };
        for ch in "-12a-3".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.year, "-123");
    }

    #[test]
    fn space_toggles_read_checkbox() {
        let mut form = BookForm {
            active: BookField::Read,
            ..BookForm::default()
        };
        assert!(form.push_char(' '));
        assert!(form.is_complete);
        assert!(!form.push_char('x'));
        assert!(form.is_complete);
    }

    #[test]
    fn edit_form_round_trips_into_a_draft() {
        let book = BookRecord {
            id: 9,
            title: "Dune".into(),
            author: "Herbert".into(),
            year: 1965,
            is_complete: true,
        };
        let draft = BookForm::from_record(&book).to_draft();
        assert_eq!(draft, BookDraft::new("Dune", "Herbert", "1965", true));
    }
}
