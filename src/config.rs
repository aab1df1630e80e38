//! Configuration for twinpane.
//!
//! Settings are read from `twinpane.toml`:
//! - [general]: loop timeouts, listing rules, terminal limits and IPC.
//! - [input]: key bindings per command and the editor used to open files.
//! - [load]: locating, parsing and defaulting the whole file.

pub mod general;
pub mod input;
pub mod load;

pub use general::{General, InternalGeneral};
pub use input::{Editor, Keys};
pub use load::{Config, RawConfig};
