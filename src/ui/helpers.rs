use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::ListItem;

use crate::error::ShelfError;

use super::binder::BookItem;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Terminal position for a text cursor `column` cells into row `row` of
/// `area`, kept inside the area however long the input gets.
pub(crate) fn cursor_in(area: Rect, column: usize, row: usize) -> (u16, u16) {
    let clamp = |value: usize, extent: u16| {
        u16::try_from(value)
            .unwrap_or(u16::MAX)
            .min(extent.saturating_sub(1))
    };
    (
        area.x.saturating_add(clamp(column, area.width)),
        area.y.saturating_add(clamp(row, area.height)),
    )
}

/// Four-line list entry: title, author, year, then the available actions.
pub(crate) fn book_list_item(item: &BookItem) -> ListItem<'static> {
    let hint_style = Style::default().fg(Color::DarkGray);
    ListItem::new(vec![
        Line::from(Span::styled(
            item.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(item.author_line.clone()),
        Line::from(item.year_line.clone()),
        Line::from(Span::styled(
            format!("[Space] {}  [d] Delete  [e] Edit", item.toggle_label),
            hint_style,
        )),
    ])
}

/// Message worth showing to the user for a failed operation.
pub(crate) fn surface_error(err: &ShelfError) -> String {
    match err {
        ShelfError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_stays_inside_the_area() {
        let area = Rect::new(10, 5, 20, 4);
        assert_eq!(cursor_in(area, 3, 1), (13, 6));
        assert_eq!(cursor_in(area, 500, 0), (29, 5));
        assert_eq!(cursor_in(area, usize::MAX, usize::MAX), (29, 8));

        let edge = Rect::new(u16::MAX - 2, 0, 2, 1);
        assert_eq!(cursor_in(edge, 70_000, 3), (u16::MAX - 1, 0));
    }
}
