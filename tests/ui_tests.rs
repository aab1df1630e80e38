//! UI-related tests for twinpane
//!
//! These tests focus on the user interface of the twinpane TUI application,
//! including formatting and layout rendering.
//!
//! These tests may create temporary directories and files to simulate different UI scenarios.
//! These temporary resources are automatically cleaned up after the tests complete.

use ratatui::layout::Rect;
use ratatui::{Terminal, backend::TestBackend};
use twinpane::app::App;
use twinpane::config::{Config, RawConfig};
use twinpane::core;
use twinpane::core::formatter::sanitize_to_exact_width;
use twinpane::ui::render::{pane_areas, render};
use std::error;
use std::fs::{self, File};
use tempfile::tempdir;

#[test]
fn test_ui_sanitization_and_exact_width() {
    let pane_width = 10;

    let cases = vec![
        ("short.txt", 10),
        ("very_long_filename.txt", 10),
        ("🦀_crab.rs", 10),
        ("\t_tab", 10),
    ];

    for (input, expected_width) in cases {
        let result = sanitize_to_exact_width(input, pane_width);

        let actual_width = unicode_width::UnicodeWidthStr::width(result.as_str());

        assert_eq!(
            actual_width, expected_width,
            "Failed to produce exact width for input: '{}'. Result was: '{}' (width: {})",
            input, result, actual_width
        );

        assert!(
            !result.chars().any(|c| c.is_control() && c != ' '),
            "Result contains control characters: {:?}",
            result
        );
    }
}

#[test]
fn test_core_empty_dir() -> Result<(), Box<dyn error::Error>> {
    let temp_dir = tempdir()?;
    let entries = core::browse_dir(temp_dir.path())?;

    assert!(entries.is_empty(), "Directory should be empty");
    Ok(())
}

#[test]
fn test_pane_areas_cover_width() {
    for width in [1, 21, 80, 101] {
        let [left, right] = pane_areas(Rect::new(0, 0, width, 10));
        assert_eq!(left.width + right.width, width);
        assert_eq!(left.right(), right.x);
    }
}

#[test]
fn test_render_with_config() -> Result<(), Box<dyn error::Error>> {
    let temp_dir = tempdir()?;
    File::create(temp_dir.path().join(".hidden"))?;
    fs::create_dir(temp_dir.path().join("docs"))?;

    let toml_content = r#"
            [general]
            show_hidden = true
            ipc = false
        "#;

    let raw: RawConfig = toml::from_str(toml_content)?;
    let app = App::new(Config::from(raw), temp_dir.path())?;

    let mut terminal = Terminal::new(TestBackend::new(80, 10))?;
    terminal.draw(|frame| render(frame, &app))?;
    let text: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();

    assert!(text.contains("docs/"));
    assert!(text.contains(".hidden"));
    assert!(text.contains("1/2"));
    Ok(())
}
