//! Miscellaneous utilities for twinpane.
//!
//! - [cli]: command-line argument handling.
//! - [helpers]: path helpers shared by the app and the UI.
//! - [logging]: the tracing subscriber writing to the log file.

pub mod cli;
pub mod helpers;
pub mod logging;

pub use helpers::{describe_paths, expand_home_path, get_home, resolve_path, shorten_home_path};
