//! Application layer of twinpane.
//!
//! [App] is the concrete host of the main loop:
//! - [state]: the [App] struct and its collaborator trait implementations.
//! - [actions]: key dispatch and the commands bound to keys.
//! - [keymap]: parsing of key notation and the binding matcher.
//! - [modes]: the mode stack (normal, command line, menu, prompt).
//! - [pane]: directory panes.
//! - [cmdline]: the `:` command line and its commands.

pub mod actions;
pub mod cmdline;
pub mod keymap;
pub mod modes;
pub mod pane;
pub mod state;

pub use keymap::{Command, Keymap};
pub use modes::{Menu, Mode, Modes, Prompt};
pub use pane::Pane;
pub use state::{App, StatusLine};
