//! Status line, menu overlay and confirmation popup.

use crate::app::{App, Menu};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use unicode_width::UnicodeWidthStr;

/// Rows taken by the status area: one, or one per line of a multiline message (at
/// most half the screen).
pub fn status_height(app: &App, total: u16) -> u16 {
    let status = app.status();
    if !status.is_multiline() {
        return 1;
    }
    let lines = u16::try_from(status.message().lines().count()).unwrap_or(u16::MAX);
    lines.min(total / 2).max(1)
}

/// Draws the message (or the command line being edited) on the left and the pending
/// keys with the position ruler on the right of the last row.
pub fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    if area.height == 0 {
        return;
    }
    let last_row = Rect {
        y: area.y + area.height - 1,
        height: 1,
        ..area
    };

    let right = format!("{}  {} ", app.echo().current(), app.ruler());
    let right_width = u16::try_from(right.width()).unwrap_or(area.width);
    frame.render_widget(
        Paragraph::new(Span::styled(right, Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Right),
        last_row,
    );

    if let Some(line) = app.modes().cmdline() {
        let text = format!(":{}", line.input());
        let cursor_x = area.x + u16::try_from(text.width()).unwrap_or(area.width);
        frame.render_widget(Paragraph::new(text), shrink(area, right_width));
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(1)), area.y));
        return;
    }

    let status = app.status();
    let style = if status.is_error() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let lines: Vec<Line> = status
        .message()
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), style)))
        .collect();
    frame.render_widget(Paragraph::new(lines), shrink(area, right_width));
}

fn shrink(area: Rect, right_width: u16) -> Rect {
    Rect {
        width: area.width.saturating_sub(right_width),
        ..area
    }
}

/// Draws `menu` over `area`.
pub fn draw_menu(frame: &mut Frame, menu: &Menu, area: Rect) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", menu.title()));
    let items: Vec<ListItem> = menu
        .items()
        .iter()
        .map(|item| ListItem::new(item.as_str()))
        .collect();

    let mut state = ListState::default();
    state.select(Some(menu.cursor()));
    frame.render_stateful_widget(
        List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
        area,
        &mut state,
    );
}

/// Centered popup asking `question`.
pub fn draw_prompt(frame: &mut Frame, question: &str, area: Rect) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(3),
        Constraint::Percentage(40),
    ])
    .areas(area);
    let [_, popup_area, _] = Layout::horizontal([
        Constraint::Percentage(20),
        Constraint::Percentage(60),
        Constraint::Percentage(20),
    ])
    .areas(middle);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    frame.render_widget(
        Paragraph::new(question)
            .block(block)
            .alignment(Alignment::Center),
        popup_area,
    );
}
