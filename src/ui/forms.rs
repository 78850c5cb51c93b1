use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use thiserror::Error;

/// Smallest and largest publication years the form accepts.
const YEAR_MIN: i64 = 1000;
const YEAR_MAX: i64 = 9999;

/// Validation failures caught in the form layer, before the store is ever
/// touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum FormError {
    #[error("{0} is required.")]
    EmptyField(&'static str),
    #[error("Year must be a number between 1000 and 9999.")]
    YearOutOfRange,
}

/// Typed values ready for persistence, produced by a successful validation
/// pass over the add-book form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BookInput {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: i64,
    pub(crate) genre: String,
    pub(crate) read: bool,
}

/// Fields available within the add-book form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
    Genre,
    Read,
}

/// Internal representation of the add-book form. Text fields hold raw input;
/// the read flag is toggled directly with Space.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) genre: String,
    pub(crate) read: bool,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

impl BookForm {
    /// Cycle focus forward across the five fields.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Year,
            BookField::Year => BookField::Genre,
            BookField::Genre => BookField::Read,
            BookField::Read => BookField::Title,
        };
    }

    /// Cycle focus backward across the five fields.
    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Read,
            BookField::Author => BookField::Title,
            BookField::Year => BookField::Author,
            BookField::Genre => BookField::Year,
            BookField::Read => BookField::Genre,
        };
    }

    /// Append a character to the active field, validating allowed input. The
    /// year field only accepts digits and is capped at four characters.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Year => {
                if !ch.is_ascii_digit() || self.year.len() >= 4 {
                    return false;
                }
                self.year.push(ch);
            }
            BookField::Genre => self.genre.push(ch),
            BookField::Read => return false,
        }
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
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
            BookField::Genre => {
                self.genre.pop();
            }
            BookField::Read => {}
        }
    }

    /// Flip the read checkbox when it has focus. Returns whether the key was
    /// consumed.
    pub(crate) fn toggle_read_flag(&mut self) -> bool {
        if self.active == BookField::Read {
            self.read = !self.read;
            true
        } else {
            false
        }
    }

    /// Validate the inputs and return typed values ready for persistence.
    /// This is the only gate between user input and the store; the store
    /// itself performs no validation.
    pub(crate) fn parse_inputs(&self) -> Result<BookInput, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::EmptyField("Title"));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(FormError::EmptyField("Author"));
        }
        let year = self
            .year
            .trim()
            .parse::<i64>()
            .map_err(|_| FormError::YearOutOfRange)?;
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return Err(FormError::YearOutOfRange);
        }
        let genre = self.genre.trim();
        if genre.is_empty() {
            return Err(FormError::EmptyField("Genre"));
        }

        Ok(BookInput {
            title: title.to_string(),
            author: author.to_string(),
            year,
            genre: genre.to_string(),
            read: self.read,
        })
    }

    /// Render a single styled line for the modal form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let is_active = self.active == field;

        if field == BookField::Read {
            let checkbox = if self.read { "[x] read" } else { "[ ] read" };
            let style = if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            return Line::from(vec![
                Span::raw(format!("{field_name}: ")),
                Span::styled(checkbox.to_string(), style),
            ]);
        }

        let value = match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => &self.year,
            BookField::Genre => &self.genre,
            BookField::Read => unreachable!(),
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
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }
}

/// Form state for the remove-by-title modal. Prefilled with the selected
/// book's title when one is highlighted.
#[derive(Default, Clone)]
pub(crate) struct RemoveForm {
    pub(crate) title: String,
    pub(crate) error: Option<String>,
}

impl RemoveForm {
    /// Seed the form with the currently selected title so removing the
    /// highlighted book is a two-keystroke flow.
    pub(crate) fn with_title(title: &str) -> Self {
        Self {
            title: title.to_string(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.title.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.title.pop();
    }

    /// Validate that a title was entered before hitting the store.
    pub(crate) fn parse_title(&self) -> Result<String, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::EmptyField("Title"));
        }
        Ok(title.to_string())
    }

    /// Render the single input line for the modal widget.
    pub(crate) fn build_line(&self) -> Line<'static> {
        let display = if self.title.is_empty() {
            "<required>".to_string()
        } else {
            self.title.clone()
        };
        let style = if self.title.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Yellow)
        };
        Line::from(vec![Span::raw("Title: "), Span::styled(display, style)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> BookForm {
        BookForm {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            year: "1965".to_string(),
            genre: "Sci-Fi".to_string(),
            read: false,
            active: BookField::Title,
            error: None,
        }
    }

    #[test]
    fn valid_form_parses_into_typed_input() {
        let input = filled_form().parse_inputs().unwrap();
        assert_eq!(
            input,
            BookInput {
                title: "Dune".to_string(),
                author: "Herbert".to_string(),
                year: 1965,
                genre: "Sci-Fi".to_string(),
                read: false,
            }
        );
    }

    #[test]
    fn empty_required_fields_are_rejected() {
        let mut form = filled_form();
        form.title = "   ".to_string();
        assert_eq!(form.parse_inputs(), Err(FormError::EmptyField("Title")));

        let mut form = filled_form();
        form.author.clear();
        assert_eq!(form.parse_inputs(), Err(FormError::EmptyField("Author")));

        let mut form = filled_form();
        form.genre.clear();
        assert_eq!(form.parse_inputs(), Err(FormError::EmptyField("Genre")));
    }

    #[test]
    fn year_must_be_a_four_digit_number() {
        let mut form = filled_form();
        form.year = "999".to_string();
        assert_eq!(form.parse_inputs(), Err(FormError::YearOutOfRange));

        let mut form = filled_form();
        form.year.clear();
        assert_eq!(form.parse_inputs(), Err(FormError::YearOutOfRange));
    }

    #[test]
    fn year_field_only_accepts_up_to_four_digits() {
        let mut form = BookForm {
            active: BookField::Year,
            ..BookForm::default()
        };
        assert!(!form.push_char('x'));
        for ch in ['1', '9', '6', '5'] {
            assert!(form.push_char(ch));
        }
        assert!(!form.push_char('4'));
        assert_eq!(form.year, "1965");
    }

    #[test]
    fn read_flag_toggles_only_when_focused() {
        let mut form = filled_form();
        assert!(!form.toggle_read_flag());
        form.active = BookField::Read;
        assert!(form.toggle_read_flag());
        assert!(form.read);
    }

    #[test]
    fn remove_form_requires_a_title() {
        let form = RemoveForm::default();
        assert_eq!(form.parse_title(), Err(FormError::EmptyField("Title")));

        let form = RemoveForm::with_title("Dune");
        assert_eq!(form.parse_title().unwrap(), "Dune");
    }
}
