//! UI renderer implementation.
//!
//! Contains the top-level `render` entry point used by the app and the layout helpers
//! that split the screen into the two panes and the status area.

use crate::app::App;
use crate::ui::{panes, widgets};

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
};

/// Renders the whole UI: both panes, the status area and whatever mode overlays them.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_height = widgets::status_height(app, area.height);
    let [panes_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(status_height)]).areas(area);

    for (idx, (pane, pane_area)) in app.panes().iter().zip(pane_areas(panes_area)).enumerate() {
        panes::draw_pane(frame, pane, pane_area, idx == app.active_index());
    }

    if let Some(menu) = app.modes().menu() {
        widgets::draw_menu(frame, menu, panes_area);
    }
    if let Some(prompt) = app.modes().prompt() {
        widgets::draw_prompt(frame, prompt.question(), panes_area);
    }

    widgets::draw_status(frame, app, status_area);
}

/// Left and right halves of the pane area.
pub fn pane_areas(area: Rect) -> [Rect; 2] {
    Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::KeyDispatcher;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
    use std::error;
    use std::fs::File;
    use tempfile::tempdir;

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn panes_split_evenly() {
        let [left, right] = pane_areas(Rect::new(0, 0, 80, 20));
        assert_eq!(left.width, 40);
        assert_eq!(right.x, 40);
        assert_eq!(right.height, 20);
    }

    #[test]
    fn draws_entries_ruler_and_menu() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        File::create(dir.path().join("hello.txt"))?;
        let mut app = App::new(Config::default(), dir.path())?;
        let mut terminal = Terminal::new(TestBackend::new(60, 12))?;

        terminal.draw(|f| render(f, &app))?;
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("hello.txt"));
        assert!(text.contains("1/1"));

        app.submit(&['?']);
        terminal.draw(|f| render(f, &app))?;
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Key bindings"));
        Ok(())
    }

    #[test]
    fn multiline_message_grows_status_area() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let mut app = App::new(Config::default(), dir.path())?;
        app.run_command_line(r"echo first line\nsecond line");
        assert_eq!(widgets::status_height(&app, 20), 2);

        let mut terminal = Terminal::new(TestBackend::new(60, 12))?;
        terminal.draw(|f| render(f, &app))?;
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("first line"));
        assert!(text.contains("second line"));
        Ok(())
    }
}
