//! Terminal UI of twinpane, drawn with ratatui.
//!
//! - [render]: the frame layout and the entry point called by the app.
//! - [panes]: the two directory listings.
//! - [widgets]: the status line, the menu overlay and the confirmation popup.
//!
//! Drawing only reads the [App](crate::app::App); it never changes state.

pub mod panes;
pub mod render;
pub mod widgets;

pub use render::render;
