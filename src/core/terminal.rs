//! Terminal backend of the main loop.
//!
//! Owns raw mode, the alternate screen and the ratatui [Terminal]. Turns crossterm key
//! events into the characters the key buffer works with and tracks whether the
//! terminal is large enough to be used.

use crate::app::App;
use crate::core::event_loop;
use crate::core::host::TerminalState;
use crate::core::keys::{self, BACK_TAB, BACKSPACE, ENTER, ESC, TAB};
use crate::error::Result;

use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Alignment;
use ratatui::widgets::{Paragraph, Wrap};

use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;

pub type Backend = CrosstermBackend<Stdout>;

/// Whether the terminal is large enough, and whether it was resized since the last
/// full redraw.
#[derive(Debug)]
struct SizeGate {
    state: TerminalState,
    min_size: (u16, u16),
    resized: bool,
}

impl SizeGate {
    fn new(min_width: u16, min_height: u16) -> Self {
        Self {
            state: TerminalState::Normal,
            min_size: (min_width.max(1), min_height.max(1)),
            resized: false,
        }
    }

    fn update(&mut self, (w, h): (u16, u16)) -> TerminalState {
        let too_small = w < self.min_size.0 || h < self.min_size.1;
        self.state = match (self.state, too_small) {
            (_, true) => TerminalState::TooSmall,
            (TerminalState::TooSmall, false) => TerminalState::BackToNormal,
            (state, false) => state,
        };
        self.state
    }

    fn set_state(&mut self, state: TerminalState) {
        // Acknowledging a recovery comes with a full redraw, which covers the resize.
        if self.state == TerminalState::BackToNormal && state == TerminalState::Normal {
            self.resized = false;
        }
        self.state = state;
    }

    fn note_resize(&mut self) {
        self.gate.note_resize();
    }

    fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }
}

/// The terminal as seen by the loop.
pub struct Tui {
    terminal: Terminal<Backend>,
    pending: VecDeque<char>,
    gate: SizeGate,
    attached: bool,
}

impl Tui {
    /// Enters raw mode and the alternate screen.
    pub fn new(min_width: u16, min_height: u16) -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        let mut tui = Self {
            terminal,
            pending: VecDeque::new(),
            gate: SizeGate::new(min_width, min_height),
            attached: false,
        };
        tui.attach()?;
        Ok(tui)
    }

    pub fn attach(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen, Hide)?;
        self.terminal.clear()?;
        self.attached = true;
        Ok(())
    }

    pub fn detach(&mut self) -> Result<()> {
        if !self.attached {
            return Ok(());
        }
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show)?;
        self.attached = false;
        Ok(())
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<Backend> {
        &mut self.terminal
    }

    #[inline]
    pub fn state(&self) -> TerminalState {
        self.gate.state
    }

    pub fn set_state(&mut self, state: TerminalState) {
        self.gate.set_state(state);
    }

    /// Returns and clears the "terminal was resized" flag.
    pub fn take_resized(&mut self) -> bool {
        self.gate.take_resized()
    }

    /// Re-evaluates the size of the terminal.
    ///
    /// A terminal that grows back to a usable size reports
    /// [TerminalState::BackToNormal] until someone resets it.
    pub fn refresh_state(&mut self) -> TerminalState {
        match crossterm::terminal::size() {
            Ok(size) => self.gate.update(size),
            Err(e) => {
                tracing::warn!(error = %e, "could not query terminal size");
                self.gate.state
            }
        }
    }

    pub fn show_too_small(&mut self) -> Result<()> {
        self.terminal.draw(|f| {
            let notice = Paragraph::new("Terminal is too small to run twinpane")
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(notice, f.area());
        })?;
        Ok(())
    }

    /// Blocks until the terminal is resized. Everything else read meanwhile is dropped.
    pub fn wait_for_resize(&mut self) -> Result<()> {
        loop {
            if let Event::Resize(w, h) = event::read()? {
                tracing::debug!(w, h, "resize while too small");
                self.gate.note_resize();
                return Ok(());
            }
        }
    }

    /// Waits at most `timeout` for a key.
    pub fn read_key(&mut self, timeout: Duration) -> Result<Option<char>> {
        if let Some(c) = self.pending.pop_front() {
            return Ok(Some(c));
        }

        if !event::poll(timeout)? {
            return Ok(None);
        }

        match event::read()? {
            Event::Key(key) => {
                push_key_chars(&key, &mut self.pending);
                Ok(self.pending.pop_front())
            }
            Event::Resize(..) => {
                self.gate.note_resize();
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Drops all input that is already waiting.
    pub fn drain(&mut self) -> Result<()> {
        self.pending.clear();
        while event::poll(Duration::ZERO)? {
            if let Event::Resize(..) = event::read()? {
                self.gate.note_resize();
            }
        }
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.detach() {
            tracing::error!(error = %e, "failed to restore terminal");
        }
    }
}

/// Appends the buffer characters of one key press to `out`.
///
/// Functional keys become Private Use Area characters, Ctrl combinations their C0
/// code, and Alt combinations an Escape followed by the key.
pub fn push_key_chars(key: &KeyEvent, out: &mut VecDeque<char>) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    let mods = key.modifiers;
    let c = match key.code {
        KeyCode::Char(c) if mods.contains(KeyModifiers::CONTROL) => match keys::ctrl(c) {
            Some(c) => c,
            None => return,
        },
        KeyCode::Char(c) => c,
        KeyCode::Enter => ENTER,
        KeyCode::Esc => ESC,
        KeyCode::Tab => TAB,
        KeyCode::BackTab => BACK_TAB,
        KeyCode::Backspace => BACKSPACE,
        KeyCode::Up => keys::UP,
        KeyCode::Down => keys::DOWN,
        KeyCode::Left => keys::LEFT,
        KeyCode::Right => keys::RIGHT,
        KeyCode::Home => keys::HOME,
        KeyCode::End => keys::END,
        KeyCode::PageUp => keys::PAGE_UP,
        KeyCode::PageDown => keys::PAGE_DOWN,
        KeyCode::Delete => keys::DELETE,
        KeyCode::Insert => keys::INSERT,
        KeyCode::F(n) => match keys::f_key(n) {
            Some(c) => c,
            None => return,
        },
        _ => return,
    };

    if mods.contains(KeyModifiers::ALT) {
        out.push_back(ESC);
    }
    out.push_back(c);
}

/// Sets up the terminal-facing parts of `app` and runs the main loop until it quits.
pub fn run_terminal(app: &mut App) -> Result<()> {
    let quit = app.quit_flag();
    app.start();
    let result = event_loop::run(app, &quit);
    app.shutdown();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn chars(key: KeyEvent) -> Vec<char> {
        let mut out = VecDeque::new();
        push_key_chars(&key, &mut out);
        out.into_iter().collect()
    }

    #[test]
    fn plain_and_control_keys() {
        assert_eq!(chars(press(KeyCode::Char('j'), KeyModifiers::NONE)), ['j']);
        assert_eq!(
            chars(press(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            [keys::SUSPEND]
        );
        assert_eq!(chars(press(KeyCode::Enter, KeyModifiers::NONE)), [ENTER]);
        assert_eq!(chars(press(KeyCode::F(2), KeyModifiers::NONE)), ['\u{E011}']);
    }

    #[test]
    fn alt_is_escape_prefixed() {
        assert_eq!(chars(press(KeyCode::Char('h'), KeyModifiers::ALT)), [ESC, 'h']);
    }

    #[test]
    fn recovery_leaves_no_resize_behind() {
        let mut gate = SizeGate::new(40, 10);
        assert_eq!(gate.update((20, 5)), TerminalState::TooSmall);
        gate.note_resize();
        assert_eq!(gate.update((80, 24)), TerminalState::BackToNormal);
        assert_eq!(gate.update((80, 24)), TerminalState::BackToNormal);

        gate.set_state(TerminalState::Normal);
        assert!(!gate.take_resized());

        gate.note_resize();
        assert_eq!(gate.update((100, 30)), TerminalState::Normal);
        assert!(gate.take_resized());
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = press(KeyCode::Char('x'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert!(chars(key).is_empty());
    }
}
