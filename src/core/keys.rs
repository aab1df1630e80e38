//! Key buffer and the disambiguation state machine.
//!
//! Keys are buffered until the key-dispatch engine resolves them. The engine may
//! answer that the buffer is a valid but incomplete prefix (`"d"` when `"dd"` is
//! bound), in which case the loop keeps the keys and waits: either for the next key,
//! or for the timeout after which the prefix is forced.
//!
//! Between iterations exactly one [KeyState] holds:
//! - `Idle`: nothing pending.
//! - `PendingLong`: the engine wants more input and has no timeout preference.
//! - `PendingShort`: the buffer will be force-resolved when the timeout elapses.
//! - `WaitEnter`: a multiline message waits for acknowledgment. The next key clears
//!   it; Enter is swallowed, anything else is dispatched as usual.

use crate::core::echo::FrameId;
use crate::core::host::{DispatchOutcome, DispatchStatus, Host, LoopSettings, ModeKind};
use crate::core::multiplexer::Polled;
use crate::core::updates;

use std::time::Duration;

pub const ESC: char = '\x1b';
pub const ENTER: char = '\r';
pub const TAB: char = '\t';
pub const BACKSPACE: char = '\x7f';
pub const SUSPEND: char = '\x1a';

// Functional keys live in the Private Use Area so they share the buffer with text.
pub const UP: char = '\u{E000}';
pub const DOWN: char = '\u{E001}';
pub const LEFT: char = '\u{E002}';
pub const RIGHT: char = '\u{E003}';
pub const HOME: char = '\u{E004}';
pub const END: char = '\u{E005}';
pub const PAGE_UP: char = '\u{E006}';
pub const PAGE_DOWN: char = '\u{E007}';
pub const DELETE: char = '\u{E008}';
pub const INSERT: char = '\u{E009}';
pub const BACK_TAB: char = '\u{E00A}';
const F_BASE: u32 = 0xE010;

/// Character for function key `F<n>`, `n` in `1..=24`.
pub fn f_key(n: u8) -> Option<char> {
    if (1..=24).contains(&n) {
        char::from_u32(F_BASE + u32::from(n) - 1)
    } else {
        None
    }
}

/// Control character for Ctrl+`c`, if there is one.
pub fn ctrl(c: char) -> Option<char> {
    let lower = c.to_ascii_lowercase();
    match lower {
        'a'..='z' => char::from_u32(lower as u32 - 'a' as u32 + 1),
        '[' => Some(ESC),
        ' ' | '@' => Some('\0'),
        _ => None,
    }
}

/// Pending keystrokes.
///
/// Holds at most `capacity - 2` keys; two slots stay reserved for an append and a
/// terminator. Keys beyond the limit are dropped.
#[derive(Debug)]
pub struct KeyBuffer {
    keys: Vec<char>,
    limit: usize,
}

impl KeyBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let limit = capacity.saturating_sub(2);
        Self {
            keys: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Appends `c` if there is room. Returns whether it was stored.
    pub fn push(&mut self, c: char) -> bool {
        if self.keys.len() >= self.limit {
            return false;
        }
        self.keys.push(c);
        true
    }

    /// Drops the first `n` keys, shifting the rest to the front.
    pub fn consume_front(&mut self, n: usize) {
        let n = n.min(self.keys.len());
        self.keys.drain(..n);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    #[inline]
    pub fn as_slice(&self) -> &[char] {
        &self.keys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.limit
    }

    pub fn is_lone_escape(&self) -> bool {
        self.keys.as_slice() == [ESC]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Idle,
    PendingLong,
    PendingShort,
    WaitEnter,
}

/// What one iteration of the state machine ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing was dispatched (empty timeout, swallowed key, suspend).
    Skipped,
    /// The buffer is still an unresolved prefix.
    Pending,
    /// The buffer was resolved and a multiline message now waits for Enter.
    AwaitEnter,
    /// The buffer was resolved; post-dispatch hooks are due.
    Resolved,
}

/// State of one running loop.
#[derive(Debug)]
pub struct LoopContext {
    buffer: KeyBuffer,
    timeout: Duration,
    state: KeyState,
    last: Option<DispatchOutcome>,
    settings: LoopSettings,
    frame: FrameId,
    parent: Option<FrameId>,
}

impl LoopContext {
    /// Creates the context and publishes its buffer on top of the echo stack.
    pub fn enter<H: Host + ?Sized>(host: &mut H) -> Self {
        let settings = host.loop_settings();
        let echo = host.input_echo();
        let parent = echo.current_frame();
        let frame = echo.enter();
        Self {
            buffer: KeyBuffer::with_capacity(settings.buffer_capacity),
            timeout: settings.timeout,
            state: KeyState::Idle,
            last: None,
            settings,
            frame,
            parent,
        }
    }

    /// Unpublishes this context, making the parent's buffer current again.
    pub fn leave<H: Host + ?Sized>(self, host: &mut H) {
        let echo = host.input_echo();
        echo.leave(self.frame);
        debug_assert_eq!(echo.current_frame(), self.parent);
    }

    #[inline]
    pub fn state(&self) -> KeyState {
        self.state
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[inline]
    pub fn buffer(&self) -> &KeyBuffer {
        &self.buffer
    }

    #[inline]
    pub fn last_outcome(&self) -> Option<DispatchOutcome> {
        self.last
    }

    #[inline]
    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    pub(crate) fn cancel_wait_for_enter(&mut self) {
        if self.state == KeyState::WaitEnter {
            self.state = KeyState::Idle;
        }
    }

    /// Feeds one result of the multiplexer through the state machine.
    pub fn step<H: Host + ?Sized>(&mut self, host: &mut H, polled: Polled) -> Step {
        match polled {
            Polled::Timeout => self.on_timeout(host),
            Polled::Key(c) => self.on_key(host, c),
        }
    }

    fn on_timeout<H: Host + ?Sized>(&mut self, host: &mut H) -> Step {
        if self.state == KeyState::WaitEnter || self.buffer.is_empty() {
            self.timeout = self.settings.timeout;
            return Step::Skipped;
        }

        if self.state == KeyState::PendingShort {
            let outcome = host.submit_timed_out(self.buffer.as_slice());
            self.take_consumed(outcome);
            tracing::trace!(?outcome, left = self.buffer.len(), "timed out dispatch");
            return self.resolve(host, outcome.status() == DispatchStatus::Consumed);
        }

        let outcome = host.submit(self.buffer.as_slice());
        self.apply(host, outcome, false)
    }

    fn on_key<H: Host + ?Sized>(&mut self, host: &mut H, c: char) -> Step {
        if c == SUSPEND {
            suspend(host);
            return Step::Skipped;
        }

        // Any key acknowledges the message; only Enter is used up by it.
        if self.state == KeyState::WaitEnter {
            self.state = KeyState::Idle;
            host.set_pinned(false);
            host.clear_message();
            if c == ENTER {
                return Step::Skipped;
            }
        }

        if !self.buffer.push(c) {
            tracing::trace!(limit = self.buffer.limit(), "key buffer full, key dropped");
        }
        host.set_pinned(false);

        let outcome = host.submit(self.buffer.as_slice());
        self.apply(host, outcome, true)
    }

    fn take_consumed(&mut self, outcome: DispatchOutcome) {
        let consumed = outcome.consumed_len();
        debug_assert!(
            consumed <= self.buffer.len(),
            "dispatch consumed {consumed} of {} keys",
            self.buffer.len()
        );
        self.buffer.consume_front(consumed);
        self.last = Some(outcome);
    }

    fn apply<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        outcome: DispatchOutcome,
        got_input: bool,
    ) -> Step {
        self.take_consumed(outcome);

        let short = match outcome.status() {
            DispatchStatus::Consumed => return self.resolve(host, true),
            DispatchStatus::PendingShort => true,
            DispatchStatus::PendingLong => false,
        };

        self.state = if short {
            KeyState::PendingShort
        } else {
            KeyState::PendingLong
        };

        if got_input {
            host.input_echo().publish(self.buffer.as_slice());
            host.refresh_input_bar();
        }

        // Only a lone Escape is fast-tracked; other short prefixes keep the full timeout.
        if short && self.buffer.is_lone_escape() {
            self.timeout = self.settings.escape_timeout;
        }

        if outcome.consumed_len() > 0 {
            host.input_echo().clear();
            host.refresh_input_bar();
        }

        if !host.is_pinned()
            && host.current_mode() != ModeKind::CmdLine
            && host.active_has_selection()
        {
            host.show_selection_notice();
        }

        Step::Pending
    }

    /// Ends the current sequence: the buffer is dropped and the timeout restored.
    fn resolve<H: Host + ?Sized>(&mut self, host: &mut H, consumed: bool) -> Step {
        self.timeout = self.settings.timeout;
        updates::flush(host);

        self.buffer.clear();
        host.input_echo().clear();
        host.refresh_input_bar();

        if consumed && host.is_multiline() {
            self.state = KeyState::WaitEnter;
            host.redraw_all();
            return Step::AwaitEnter;
        }

        self.state = KeyState::Idle;
        Step::Resolved
    }
}

/// Hands the terminal back to the shell and stops the process group.
fn suspend<H: Host + ?Sized>(host: &mut H) {
    if let Err(e) = host.detach() {
        tracing::warn!(error = %e, "failed to detach terminal before suspend");
    }
    if let Err(e) = host.suspend_self_and_group() {
        tracing::warn!(error = %e, "failed to stop process group");
    }
    if let Err(e) = host.restore() {
        tracing::warn!(error = %e, "failed to restore terminal after resume");
    }
    host.redraw_all();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_two_slots_free() {
        let mut buf = KeyBuffer::with_capacity(8);
        assert_eq!(buf.limit(), 6);
        for c in "abcdefgh".chars() {
            buf.push(c);
        }
        assert_eq!(buf.len(), 6);
        assert!(buf.is_full());
        assert!(!buf.push('z'));
        assert_eq!(buf.as_slice(), &['a', 'b', 'c', 'd', 'e', 'f']);
    }

    #[test]
    fn consume_front_shifts_remainder() {
        let mut buf = KeyBuffer::with_capacity(16);
        for c in "2dd".chars() {
            buf.push(c);
        }
        buf.consume_front(1);
        assert_eq!(buf.as_slice(), &['d', 'd']);
        buf.consume_front(10);
        assert!(buf.is_empty());
    }

    #[test]
    fn lone_escape_detection() {
        let mut buf = KeyBuffer::with_capacity(16);
        assert!(!buf.is_lone_escape());
        buf.push(ESC);
        assert!(buf.is_lone_escape());
        buf.push('j');
        assert!(!buf.is_lone_escape());
    }

    #[test]
    fn ctrl_and_function_keys() {
        assert_eq!(ctrl('z'), Some(SUSPEND));
        assert_eq!(ctrl('L'), Some('\x0c'));
        assert_eq!(ctrl('['), Some(ESC));
        assert_eq!(ctrl('1'), None);
        assert_eq!(f_key(1), Some('\u{E010}'));
        assert_eq!(f_key(0), None);
        assert_eq!(f_key(25), None);
    }
}
