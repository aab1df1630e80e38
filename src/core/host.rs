//! Collaborator contracts of the main loop.
//!
//! The loop itself owns nothing but its [LoopContext](crate::core::LoopContext).
//! Everything it touches (key dispatch, modes, views, the status line, the terminal,
//! background jobs and IPC) is reached through the traits below, which the
//! application state implements in one place as a [Host].
//!
//! Tests implement the same traits on a scripted fake, so every method here must be
//! callable without a real terminal behind it.

use crate::core::echo::InputEcho;
use crate::error::Result;

use std::cell::Cell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// Result of one submission of the key buffer to the key-dispatch engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// The engine resolved everything it was given.
    Consumed,
    /// The buffer is a valid prefix and the engine is happy to wait for more input.
    PendingLong,
    /// The buffer is a valid prefix that should be forced after a timeout.
    PendingShort,
}

/// Immutable `{status, consumed}` pair returned by every dispatch.
///
/// `consumed` counts the leading buffer characters the engine resolved. It never
/// exceeds the length of the buffer the engine was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    status: DispatchStatus,
    consumed: usize,
}

impl DispatchOutcome {
    #[inline]
    pub fn consumed(consumed: usize) -> Self {
        Self {
            status: DispatchStatus::Consumed,
            consumed,
        }
    }

    #[inline]
    pub fn pending_long(consumed: usize) -> Self {
        Self {
            status: DispatchStatus::PendingLong,
            consumed,
        }
    }

    #[inline]
    pub fn pending_short(consumed: usize) -> Self {
        Self {
            status: DispatchStatus::PendingShort,
            consumed,
        }
    }

    #[inline]
    pub fn status(&self) -> DispatchStatus {
        self.status
    }

    #[inline]
    pub fn consumed_len(&self) -> usize {
        self.consumed
    }
}

/// Deferred update requested by the view layer for a single pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduledEvent {
    #[default]
    None,
    Redraw,
    Reload,
    FullReload,
}

/// Usability of the terminal as last observed by the terminal collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalState {
    #[default]
    Normal,
    TooSmall,
    BackToNormal,
}

/// One of the two panes, relative to the current focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Active,
    Other,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Active, Side::Other];
}

/// Modes the loop needs to tell apart.
///
/// Mode-specific semantics live in the mode layer; the loop only asks which one is
/// current to decide whether to check directories, flush view updates or show the
/// selection notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Normal,
    CmdLine,
    Menu,
    Msg,
}

/// Shared quit flag of one loop invocation.
///
/// Whoever starts a loop owns the flag. Commands set it, the loop only reads it.
/// Nested loops get their own flag, so quitting a dialog never quits the outer loop.
#[derive(Debug, Clone, Default)]
pub struct QuitFlag(Rc<Cell<bool>>);

impl QuitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set(&self) {
        self.0.set(true);
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

/// Timing and sizing knobs of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    /// Default time to wait for the next key of an ambiguous sequence.
    pub timeout: Duration,
    /// Upper bound on how long external events may go unnoticed.
    pub min_slice: Duration,
    /// Timeout used after a lone Escape was reported as a short prefix.
    pub escape_timeout: Duration,
    /// Capacity of the key buffer, including room for an append and a terminator.
    pub buffer_capacity: usize,
}

impl LoopSettings {
    pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
    pub const DEFAULT_MIN_SLICE_MS: u64 = 150;
    pub const ESCAPE_TIMEOUT_MS: u64 = 1;
    pub const BUFFER_CAPACITY: usize = 128;
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(Self::DEFAULT_TIMEOUT_MS),
            min_slice: Duration::from_millis(Self::DEFAULT_MIN_SLICE_MS),
            escape_timeout: Duration::from_millis(Self::ESCAPE_TIMEOUT_MS),
            buffer_capacity: Self::BUFFER_CAPACITY,
        }
    }
}

/// The key-sequence matcher.
pub trait KeyDispatcher {
    /// Normal entry. May report the buffer as a pending prefix.
    fn submit(&mut self, keys: &[char]) -> DispatchOutcome;

    /// Forces resolution of an ambiguous prefix without waiting for more input.
    fn submit_timed_out(&mut self, keys: &[char]) -> DispatchOutcome;
}

pub trait ModeLayer {
    fn pre(&mut self);
    fn post(&mut self);
    fn redraw_all(&mut self);
    fn is_menu_like(&self) -> bool;
    fn primary_mode(&self) -> ModeKind;
    fn current_mode(&self) -> ModeKind;
}

pub trait ViewLayer {
    /// Returns and clears the "redraw everything" request.
    fn take_redraw_request(&mut self) -> bool;
    fn shows_dirlist(&self, side: Side) -> bool;
    /// Returns the pending event of the pane and resets it to [ScheduledEvent::None].
    fn take_scheduled_event(&mut self, side: Side) -> ScheduledEvent;
    fn redraw_view(&mut self, side: Side);
    fn reload(&mut self, side: Side, preserve_position: bool);
    /// Refreshes the position ruler of the active pane.
    fn update_ruler(&mut self);
    /// Reloads the pane if its directory changed behind our back.
    fn check_for_changes(&mut self, side: Side);
    fn set_user_selection(&mut self, user: bool);
    fn active_has_selection(&self) -> bool;
    fn show_selection_notice(&mut self);
    fn active_dir(&self) -> PathBuf;
}

pub trait StatusEcho {
    fn input_echo(&mut self) -> &mut InputEcho;
    /// Repaints the input echo after the published buffer changed.
    fn refresh_input_bar(&mut self) {}
    fn is_multiline(&self) -> bool;
    /// A pinned message survives until the user types something.
    fn is_pinned(&self) -> bool;
    fn set_pinned(&mut self, pinned: bool);
    fn show_message(&mut self, msg: &str);
    fn clear_message(&mut self);
}

pub trait Jobs {
    fn poll_jobs(&mut self);
}

pub trait Ipc {
    fn ipc_enabled(&self) -> bool;
    fn ipc_has_listener(&self) -> bool;
    fn poll_ipc(&mut self);
}

pub trait TermControl {
    fn refresh_terminal_state(&mut self) -> TerminalState;
    fn set_terminal_state(&mut self, state: TerminalState);
    fn show_too_small(&mut self);
    /// Blocks until something external (a resize) may have changed the terminal.
    fn wait_for_wake(&mut self) -> Result<()>;
    /// Waits at most `timeout` for one key.
    fn read_key(&mut self, timeout: Duration) -> Result<Option<char>>;
    /// Discards everything buffered by the terminal.
    fn drain_input(&mut self) -> Result<()>;
    /// Gives the terminal back to the shell.
    fn detach(&mut self) -> Result<()>;
    fn restore(&mut self) -> Result<()>;
}

pub trait ProcessControl {
    fn suspend_self_and_group(&mut self) -> io::Result<()>;
    fn change_dir(&mut self, path: &Path) -> io::Result<()>;
}

/// Everything the loop drives.
pub trait Host:
    KeyDispatcher + ModeLayer + ViewLayer + StatusEcho + Jobs + Ipc + TermControl + ProcessControl
{
    fn loop_settings(&self) -> LoopSettings;
}
