//! Drawing of a single directory pane.

use crate::app::Pane;
use crate::core::FileEntry;
use crate::core::formatter::sanitize_to_exact_width;
use crate::utils::shorten_home_path;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

/// Draws `pane` into `area`. The active pane gets an accented border and a reversed
/// cursor line.
pub fn draw_pane(frame: &mut Frame, pane: &Pane, area: Rect, active: bool) {
    let border_style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ", shorten_home_path(pane.dir())));

    if pane.entries().is_empty() {
        frame.render_widget(Paragraph::new(" [Empty]").block(block), area);
        return;
    }

    // Two border columns, one marker column.
    let width = usize::from(area.width.saturating_sub(3));
    let items: Vec<ListItem> = pane
        .entries()
        .iter()
        .map(|entry| {
            let selected = pane.is_selected(entry);
            let marker = if selected { '*' } else { ' ' };
            let mut name = entry.name_str().into_owned();
            if entry.is_dir() {
                name.push('/');
            }
            let text = format!("{marker}{}", sanitize_to_exact_width(&name, width));
            ListItem::new(Line::from(Span::styled(text, entry_style(entry, selected))))
        })
        .collect();

    let highlight = if active {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::UNDERLINED)
    };

    let mut state = ListState::default();
    state.select(Some(pane.cursor()));
    frame.render_stateful_widget(
        List::new(items).block(block).highlight_style(highlight),
        area,
        &mut state,
    );
}

fn entry_style(entry: &FileEntry, selected: bool) -> Style {
    let style = if entry.is_broken_sym() {
        Style::default().fg(Color::Red)
    } else if entry.is_dir() {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    } else if entry.is_symlink() {
        Style::default().fg(Color::Cyan)
    } else if entry.is_executable() {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if selected {
        style.fg(Color::Yellow)
    } else {
        style
    }
}
