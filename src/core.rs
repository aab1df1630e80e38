//! Core runtime of twinpane.
//!
//! The heart of this module is the main loop and its pieces:
//! - [host]: the collaborator traits the loop drives and the values it exchanges with them.
//! - [keys]: the key buffer and the disambiguation state machine.
//! - [multiplexer]: bounded waiting for a key while polling IPC, jobs and directories.
//! - [updates]: flushing of deferred redraws and reloads.
//! - [readiness]: the too-small-terminal gate.
//! - [event_loop]: the orchestrator, [run].
//! - [echo]: the stack of published input buffers.
//!
//! Around it sit the concrete backends used by the application:
//! - [terminal]: crossterm/ratatui terminal and key translation.
//! - [fm] and [formatter]: directory listing and entry formatting.
//! - [jobs]: background shell jobs.
//! - [ipc]: the Unix socket command channel.
//! - [proc]: process group suspension and foreground programs.

pub mod echo;
pub mod event_loop;
pub mod fm;
pub mod formatter;
pub mod host;
pub mod ipc;
pub mod jobs;
pub mod keys;
pub mod multiplexer;
pub mod proc;
pub mod readiness;
pub mod terminal;
pub mod updates;

pub use echo::{FrameId, InputEcho};
pub use event_loop::run;
pub use fm::{FileEntry, FileInfo, FileType, browse_dir};
pub use host::{
    DispatchOutcome, DispatchStatus, Host, Ipc, Jobs, KeyDispatcher, LoopSettings, ModeKind,
    ModeLayer, ProcessControl, QuitFlag, ScheduledEvent, Side, StatusEcho, TermControl,
    TerminalState, ViewLayer,
};
pub use keys::{KeyBuffer, KeyState, LoopContext, Step};
pub use multiplexer::Polled;
