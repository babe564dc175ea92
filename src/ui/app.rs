use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::error::{ShelfError, ShelfResult};
use crate::models::Category;
use crate::store::Store;

use super::binder::{BinderAction, BookBinder, BookItem, EditState};
use super::forms::{BookField, ConfirmBookDelete};
use super::helpers::{book_list_item, centered_rect, cursor_in, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Fine-grained input modes. Exactly one is active at a time.
enum Mode {
    Normal,
    /// The shared entry form is open; whether it creates or edits is the
    /// binder's [`EditState`].
    Form,
    Searching(SearchState),
    ConfirmDelete(ConfirmBookDelete),
}

/// State for the search bar while it is open.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
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

/// Terminal front-end state on top of a [`BookBinder`].
pub struct App<S: Store> {
    binder: BookBinder<S>,
    focus: Category,
    selected_incomplete: usize,
    selected_complete: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl<S: Store> App<S> {
    pub fn new(binder: BookBinder<S>) -> Self {
        Self {
            binder,
            focus: Category::Incomplete,
            selected_incomplete: 0,
            selected_complete: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn binder(&self) -> &BookBinder<S> {
        &self.binder
    }

    /// Text currently shown in the status line.
    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    pub fn focus(&self) -> Category {
        self.focus
    }

    /// Item under the cursor in the focused pane.
    pub fn current_item(&self) -> Option<&BookItem> {
        self.binder
            .view()
            .group(self.focus)
            .get(self.selected_index(self.focus))
    }

    /// Feed one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> ShelfResult<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Form => self.handle_form(code)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };
        self.clamp_selection();
        Ok(exit)
    }

    /// Ctrl-R: drop the active search filter.
    pub(crate) fn handle_ctrl_r(&mut self) -> ShelfResult<()> {
        if matches!(self.mode, Mode::Normal) && self.binder.view().query().is_some() {
            self.run(BinderAction::Search(String::new()))?;
            self.clamp_selection();
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> ShelfResult<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.focus = self.focus.other();
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-5),
            KeyCode::PageDown => self.move_selection(5),
            KeyCode::Home => self.set_selection(0),
            KeyCode::End => self.set_selection(usize::MAX),
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                if matches!(self.binder.edit_state(), EditState::Editing { .. }) {
                    self.binder.dispatch(BinderAction::CancelEdit)?;
                }
                return Ok(Mode::Form);
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(id) = self.current_item().map(|item| item.id) {
                    self.clear_status();
                    if self.run(BinderAction::BeginEdit(id))? {
                        return Ok(Mode::Form);
                    }
                } else {
                    self.set_status("No book selected to edit.", StatusKind::Error);
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('t') => {
                if let Some(id) = self.current_item().map(|item| item.id) {
                    self.run(BinderAction::ToggleCompletion(id))?;
                } else {
                    self.set_status("No book selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('-') | KeyCode::Char('d') => {
                if let Some(item) = self.current_item() {
                    let confirm = ConfirmBookDelete {
                        id: item.id,
                        title: item.title.clone(),
                    };
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(confirm));
                }
                self.set_status("No book selected to delete.", StatusKind::Error);
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                let query = self.binder.view().query().unwrap_or_default().to_string();
                return Ok(Mode::Searching(SearchState { query }));
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    /// Key handling while the entry form is open. Validation errors keep the
    /// form open with the message underneath the fields.
    fn handle_form(&mut self, code: KeyCode) -> ShelfResult<Mode> {
        match code {
            KeyCode::Esc => {
                if matches!(self.binder.edit_state(), EditState::Editing { .. }) {
                    self.run(BinderAction::CancelEdit)?;
                } else {
                    self.binder.form_mut().reset();
                    self.set_status("Add book cancelled.", StatusKind::Info);
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => self.binder.form_mut().next_field(),
            KeyCode::BackTab | KeyCode::Up => self.binder.form_mut().previous_field(),
            KeyCode::Backspace => self.binder.form_mut().backspace(),
            KeyCode::Enter => {
                let editing = self.binder.edit_state();
                match self.binder.dispatch(BinderAction::SubmitForm) {
                    Ok(message) => {
                        self.set_status(message, StatusKind::Info);
                        if let EditState::Editing { id } = editing {
                            self.follow(id);
                        }
                        return Ok(Mode::Normal);
                    }
                    Err(err @ ShelfError::Validation(_)) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                    }
                    Err(err @ ShelfError::NotFound(_)) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        return Ok(Mode::Normal);
                    }
                    Err(err) => return Err(err),
                }
            }
            KeyCode::Char(ch) => {
                let form = self.binder.form_mut();
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::Form)
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> ShelfResult<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Search cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                self.run(BinderAction::Search(state.query))?;
                self.set_selection(0);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => {}
        }
        Ok(Mode::Searching(state))
    }

    fn handle_confirm_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmBookDelete,
    ) -> ShelfResult<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.run(BinderAction::Delete(confirm.id))?;
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Dispatch an action and report the outcome in the footer. Recoverable
    /// failures become status messages and yield `false`; storage failures
    /// propagate.
    fn run(&mut self, action: BinderAction) -> ShelfResult<bool> {
        let target = match &action {
            BinderAction::ToggleCompletion(id) => Some(*id),
            _ => None,
        };
        match self.binder.dispatch(action) {
            Ok(message) => {
                self.set_status(message, StatusKind::Info);
                if let Some(id) = target {
                    self.follow(id);
                }
                Ok(true)
            }
            Err(err @ (ShelfError::Validation(_) | ShelfError::NotFound(_))) => {
                self.set_status(surface_error(&err), StatusKind::Error);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Keep the cursor on `id` after it moved between panes.
    fn follow(&mut self, id: i64) {
        let view = self.binder.view();
        let Some(category) = view.locate(id) else {
            return;
        };
        if let Some(index) = view.group(category).iter().position(|item| item.id == id) {
            self.focus = category;
            *self.selection_mut(category) = index;
        }
    }

    fn selected_index(&self, category: Category) -> usize {
        match category {
            Category::Incomplete => self.selected_incomplete,
            Category::Complete => self.selected_complete,
        }
    }

    fn selection_mut(&mut self, category: Category) -> &mut usize {
        match category {
            Category::Incomplete => &mut self.selected_incomplete,
            Category::Complete => &mut self.selected_complete,
        }
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.binder.view().group(self.focus).len();
        if len == 0 {
            return;
        }
        let current = self.selected_index(self.focus) as isize;
        let next = (current + offset).clamp(0, len as isize - 1);
        *self.selection_mut(self.focus) = next as usize;
    }

    fn set_selection(&mut self, index: usize) {
        *self.selection_mut(self.focus) = index;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        for category in [Category::Incomplete, Category::Complete] {
            let len = self.binder.view().group(category).len();
            let selected = self.selection_mut(category);
            if len == 0 {
                *selected = 0;
            } else if *selected >= len {
                *selected = len - 1;
            }
        }
    }

    fn set_status<T: Into<String>>(&mut self, text: T, kind: StatusKind) {
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

        self.draw_shelves(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Form => self.draw_book_form(frame, area),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_shelves(&self, frame: &mut Frame, area: Rect) {
        let view = self.binder.view();
        let (filter_area, panes_area) = match view.query() {
            Some(_) if area.height > 1 => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(1), Constraint::Min(0)])
                    .split(area);
                (Some(chunks[0]), chunks[1])
            }
            _ => (None, area),
        };

        if let (Some(filter_area), Some(query)) = (filter_area, view.query()) {
            let line = Line::from(vec![
                Span::styled("Filter: ", Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("\"{query}\""),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled("  (Ctrl-R to clear)", Style::default().fg(Color::DarkGray)),
            ]);
            frame.render_widget(Paragraph::new(line), filter_area);
        }

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(panes_area);

        for (category, pane) in [Category::Incomplete, Category::Complete]
            .into_iter()
            .zip(panes.iter().copied())
        {
            self.draw_pane(frame, pane, category);
        }
    }

    fn draw_pane(&self, frame: &mut Frame, area: Rect, category: Category) {
        let items = self.binder.view().group(category);
        let focused = self.focus == category;
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", category.heading(), items.len()));
        if focused {
            block = block.border_style(Style::default().fg(Color::Yellow));
        }

        if items.is_empty() {
            let message = match category {
                Category::Incomplete => "Nothing left to read. Press '+' to add a book.",
                Category::Complete => "No finished books yet.",
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let list = List::new(items.iter().map(book_list_item))
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        let selected = focused.then(|| self.selected_index(category));
        let mut state = ListState::default().with_selected(selected);
        frame.render_stateful_widget(list, area, &mut state);
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

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let pairs: &[(&str, &str)] = match &self.mode {
            Mode::Normal => &[
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[Space]", " Read/Unread   "),
                ("[d]", " Delete   "),
                ("[f]", " Search   "),
                ("[Tab]", " Switch Shelf   "),
                ("[q]", " Quit"),
            ],
            Mode::Form => &[
                ("[Tab]", " Next Field   "),
                ("[Space]", " Toggle Read   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::Searching(_) => &[("[Enter]", " Apply   "), ("[Esc]", " Cancel")],
            Mode::ConfirmDelete(_) => &[("[y]", " Delete   "), ("[n]", " Keep")],
        };

        let spans: Vec<Span<'static>> = pairs
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect) {
        let form = self.binder.form();
        let title = match self.binder.edit_state() {
            EditState::Viewing => "Add Book",
            EditState::Editing { .. } => "Edit Book",
        };
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save | Tab to switch | Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        // One row per field, so the cursor row always matches the field.
        frame.render_widget(Paragraph::new(lines), inner);

        let row = BookField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0);
        let prefix = form.active.label().len() + 2;
        let offset = match form.active {
            // Park the cursor inside the checkbox brackets.
            BookField::Read => 1,
            field => form.value_len(field),
        };
        frame.set_cursor_position(cursor_in(inner, prefix.saturating_add(offset), row));
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

        let block = Block::default().borders(Borders::ALL).title("Search by title");
        let paragraph =
            Paragraph::new(Span::raw(format!("Search: {}", state.query))).block(block.clone());
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let column = "Search: ".len().saturating_add(state.query.chars().count());
        frame.set_cursor_position(cursor_in(inner, column, 0));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete \"{}\"?", confirm.title)),
            Line::from("This cannot be undone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}
