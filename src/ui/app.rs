use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::db::Library;
use crate::models::{Book, LibraryStats};

use super::forms::{BookField, BookForm, RemoveForm};
use super::helpers::{centered_rect, surface_error};
use super::screens::SearchScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// High-level navigation states. Keeping this explicit makes it easy to
/// reason about which rendering path runs and what keyboard shortcuts should
/// do.
enum Screen {
    Library,
    Search(SearchScreen),
}

/// Fine-grained modes scoped to the current screen. Every modal holds its own
/// form state so cancelling simply drops it.
enum Mode {
    Normal,
    AddingBook(BookForm),
    RemovingBook(RemoveForm),
    Searching(SearchState),
    ShowingStats(LibraryStats),
}

/// State for the inline search query bar.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. The book list is a cache
/// of the store's contents and is re-fetched after every mutation, so the
/// database file stays the single source of truth.
pub struct App {
    library: Library,
    books: Vec<Book>,
    selected: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(library: Library, books: Vec<Book>) -> Self {
        Self {
            library,
            books,
            selected: 0,
            screen: Screen::Library,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Dispatch one key press. Returns `true` when the application should
    /// exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::RemovingBook(form) => self.handle_remove_book(code, form)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
            Mode::ShowingStats(stats) => self.handle_show_stats(code, stats),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Library => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        *exit = true;
                    }
                    KeyCode::Up => self.move_selection(-1),
                    KeyCode::Down => self.move_selection(1),
                    KeyCode::PageUp => self.move_selection(-5),
                    KeyCode::PageDown => self.move_selection(5),
                    KeyCode::Home => self.select_first(),
                    KeyCode::End => self.select_last(),
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        if let Some(book) = self.current_book().cloned() {
                            self.toggle_by_title(&book.title)?;
                        } else {
                            self.set_status("No book selected.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::AddingBook(BookForm::default()));
                    }
                    KeyCode::Char('-') => {
                        self.clear_status();
                        let form = match self.current_book() {
                            Some(book) => RemoveForm::with_title(&book.title),
                            None => RemoveForm::default(),
                        };
                        return Ok(Mode::RemovingBook(form));
                    }
                    KeyCode::Char('f') | KeyCode::Char('F') => {
                        self.clear_status();
                        return Ok(Mode::Searching(SearchState {
                            query: String::new(),
                        }));
                    }
                    KeyCode::Char('t') | KeyCode::Char('T') => {
                        return Ok(self.open_statistics());
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Search(ref mut search) => {
                let mut toggle_title: Option<String> = None;
                let mut remove_prefill: Option<Option<String>> = None;
                let mut back_to_library = false;
                let mut show_stats = false;

                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc => back_to_library = true,
                    KeyCode::Up => search.move_selection(-1),
                    KeyCode::Down => search.move_selection(1),
                    KeyCode::PageUp => search.move_selection(-5),
                    KeyCode::PageDown => search.move_selection(5),
                    KeyCode::Home => search.select_first(),
                    KeyCode::End => search.select_last(),
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        if let Some(book) = search.current_book() {
                            toggle_title = Some(book.title.clone());
                        }
                    }
                    KeyCode::Char('f') | KeyCode::Char('F') => {
                        return Ok(Mode::Searching(SearchState {
                            query: String::new(),
                        }));
                    }
                    KeyCode::Char('-') => {
                        remove_prefill = Some(search.current_book().map(|b| b.title.clone()));
                    }
                    KeyCode::Char('t') | KeyCode::Char('T') => show_stats = true,
                    _ => {}
                }

                if back_to_library {
                    self.clear_status();
                    self.screen = Screen::Library;
                } else if let Some(title) = toggle_title {
                    self.toggle_by_title(&title)?;
                } else if let Some(prefill) = remove_prefill {
                    self.clear_status();
                    let form = match prefill {
                        Some(title) => RemoveForm::with_title(&title),
                        None => RemoveForm::default(),
                    };
                    return Ok(Mode::RemovingBook(form));
                } else if show_stats {
                    return Ok(self.open_statistics());
                }

                Ok(Mode::Normal)
            }
        }
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok(input) => {
                    match self.library.add(
                        &input.title,
                        &input.author,
                        input.year,
                        &input.genre,
                        input.read,
                    ) {
                        Ok(book) => {
                            self.refresh_books()?;
                            self.set_status(
                                format!("'{}' added.", book.display_title()),
                                StatusKind::Info,
                            );
                            keep_open = false;
                        }
                        Err(err) => {
                            let message = surface_error(&err);
                            form.error = Some(message.clone());
                            self.set_status(message, StatusKind::Error);
                        }
                    }
                }
                Err(validation) => {
                    let message = validation.to_string();
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if ch == ' ' && form.toggle_read_flag() {
                    form.error = None;
                } else if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_remove_book(&mut self, code: KeyCode, mut form: RemoveForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Remove book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_title() {
                Ok(title) => match self.library.remove(&title) {
                    Ok(true) => {
                        self.refresh_books()?;
                        self.refresh_search_results()?;
                        self.set_status(format!("'{title}' removed."), StatusKind::Info);
                        keep_open = false;
                    }
                    Ok(false) => {
                        let message = format!("No book titled '{title}' found.");
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                },
                Err(validation) => {
                    let message = validation.to_string();
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::RemovingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Search cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Backspace => {
                state.query.pop();
                Ok(Mode::Searching(state))
            }
            KeyCode::Enter => match self.library.search(&state.query) {
                Ok(results) => {
                    if results.is_empty() {
                        self.set_status("No matching books found.", StatusKind::Error);
                    } else {
                        self.set_status(
                            format!("Found {} matching book(s).", results.len()),
                            StatusKind::Info,
                        );
                    }
                    self.screen = Screen::Search(SearchScreen::new(state.query, results));
                    Ok(Mode::Normal)
                }
                Err(err) => {
                    self.set_status(surface_error(&err), StatusKind::Error);
                    Ok(Mode::Searching(state))
                }
            },
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                }
                Ok(Mode::Searching(state))
            }
            _ => Ok(Mode::Searching(state)),
        }
    }

    fn handle_show_stats(&mut self, code: KeyCode, stats: LibraryStats) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('t') | KeyCode::Char('T')
            | KeyCode::Char('q') => Mode::Normal,
            _ => Mode::ShowingStats(stats),
        }
    }

    /// Flip the read flag through the store and report the outcome in the
    /// footer. A missing title is a warning, not a failure.
    fn toggle_by_title(&mut self, title: &str) -> Result<()> {
        match self.library.toggle_read(title) {
            Ok(Some(true)) => {
                self.refresh_books()?;
                self.refresh_search_results()?;
                self.set_status(format!("Marked '{title}' as read."), StatusKind::Info);
            }
            Ok(Some(false)) => {
                self.refresh_books()?;
                self.refresh_search_results()?;
                self.set_status(format!("Marked '{title}' as unread."), StatusKind::Info);
            }
            Ok(None) => {
                self.set_status(
                    format!("No book titled '{title}' found."),
                    StatusKind::Error,
                );
            }
            Err(err) => {
                self.set_status(surface_error(&err), StatusKind::Error);
            }
        }
        Ok(())
    }

    fn open_statistics(&mut self) -> Mode {
        match self.library.statistics() {
            Ok(stats) => {
                self.clear_status();
                Mode::ShowingStats(stats)
            }
            Err(err) => {
                self.set_status(surface_error(&err), StatusKind::Error);
                Mode::Normal
            }
        }
    }

    /// Re-fetch the book list after a mutation and keep the selection in
    /// bounds.
    fn refresh_books(&mut self) -> Result<()> {
        self.books = self.library.list_all()?;
        if self.books.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.books.len() {
            self.selected = self.books.len() - 1;
        }
        Ok(())
    }

    /// Re-run the active search query so the results screen reflects the
    /// store after a toggle or removal.
    fn refresh_search_results(&mut self) -> Result<()> {
        if let Screen::Search(search) = &mut self.screen {
            let results = self.library.search(&search.query)?;
            search.set_results(results);
        }
        Ok(())
    }

    fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        if self.books.is_empty() {
            return;
        }
        let len = self.books.len() as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    fn select_first(&mut self) {
        if !self.books.is_empty() {
            self.selected = 0;
        }
    }

    fn select_last(&mut self) {
        if !self.books.is_empty() {
            self.selected = self.books.len() - 1;
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Library => self.draw_library(frame, content_area),
            Screen::Search(search) => self.draw_search_results(frame, content_area, search),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::RemovingBook(form) => self.draw_remove_form(frame, area, form),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::ShowingStats(stats) => self.draw_stats(frame, area, stats),
            Mode::Normal => {}
        }
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Your Library ({} books)", self.books.len()));

        if self.books.is_empty() {
            let message = Paragraph::new("No books in your library. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self.books.iter().map(|book| ListItem::new(book_line(book))).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_search_results(&self, frame: &mut Frame, area: Rect, search: &SearchScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("Search", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                "  '{}' matched {} book(s)",
                search.query,
                search.results.len()
            )),
        ]))
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("Results"));
        frame.render_widget(header, chunks[0]);

        if search.results.is_empty() {
            let message = Paragraph::new("No matching books found. Press 'f' to search again.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = search
            .results
            .iter()
            .map(|book| ListItem::new(book_line(book)))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(search.selected));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(_)) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[Space]", key_style),
                Span::raw(" Toggle Read   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::RemovingBook(_)) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Remove   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::Searching(_)) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Search   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::ShowingStats(_)) => Line::from(vec![
                Span::styled("[Esc]", key_style),
                Span::raw(" Close"),
            ]),
            (Screen::Search(_), _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Space]", key_style),
                Span::raw(" Toggle Read   "),
                Span::styled("[-]", key_style),
                Span::raw(" Remove   "),
                Span::styled("[f]", key_style),
                Span::raw(" New Search   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::Library, _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Space]", key_style),
                Span::raw(" Toggle Read   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[-]", key_style),
                Span::raw(" Remove   "),
                Span::styled("[f]", key_style),
                Span::raw(" Search   "),
                Span::styled("[t]", key_style),
                Span::raw(" Statistics   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup);

        let mut lines = vec![
            form.build_line("Title", BookField::Title),
            form.build_line("Author", BookField::Author),
            form.build_line("Year", BookField::Year),
            form.build_line("Genre", BookField::Genre),
            form.build_line("Read", BookField::Read),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Tab switches fields, Enter saves, Esc cancels.",
            Style::default().fg(Color::DarkGray),
        )));

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Add Book"));
        frame.render_widget(paragraph, popup);
    }

    fn draw_remove_form(&self, frame: &mut Frame, area: Rect, form: &RemoveForm) {
        let popup = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup);

        let mut lines = vec![
            form.build_line(),
            Line::from(""),
            Line::from(Span::styled(
                "Removes every book with this exact title.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Remove Book"));
        frame.render_widget(paragraph, popup);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Title or author: {}", state.query)))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_stats(&self, frame: &mut Frame, area: Rect, stats: &LibraryStats) {
        let popup = centered_rect(40, 40, area);
        frame.render_widget(Clear, popup);

        let lines = vec![
            Line::from(format!("Total books: {}", stats.total)),
            Line::from(format!("Books read:  {}", stats.read)),
            Line::from(format!("Completion:  {:.1}%", stats.percent_read)),
            Line::from(""),
            Line::from(Span::styled(
                "Esc closes.",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Library Statistics"),
        );
        frame.render_widget(paragraph, popup);
    }
}

/// Render one list row: read marker, bold title, then the remaining fields.
fn book_line(book: &Book) -> Line<'static> {
    let marker_style = if book.read {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Line::from(vec![
        Span::styled(book.read_marker(), marker_style),
        Span::raw(" "),
        Span::styled(
            book.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " - {} ({}) [{}]",
            book.author, book.year, book.genre
        )),
    ])
}
