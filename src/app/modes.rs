//! Mode stack of the application.
//!
//! The bottom of the stack is always normal mode. A menu is a primary mode of its own;
//! the command line and confirmation prompts sit on top of whichever primary mode is
//! active.

use crate::app::cmdline::CmdLine;
use crate::core::{ModeKind, QuitFlag};

#[derive(Debug)]
pub enum Mode {
    Normal,
    CmdLine(CmdLine),
    Menu(Menu),
    Msg(Prompt),
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Normal => ModeKind::Normal,
            Mode::CmdLine(_) => ModeKind::CmdLine,
            Mode::Menu(_) => ModeKind::Menu,
            Mode::Msg(_) => ModeKind::Msg,
        }
    }
}

/// Scrollable list of lines with a cursor.
#[derive(Debug)]
pub struct Menu {
    title: String,
    items: Vec<String>,
    cursor: usize,
}

impl Menu {
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            title: title.into(),
            items,
            cursor: 0,
        }
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[inline]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let last = self.items.len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }
}

/// A yes/no question answered from a nested loop.
///
/// The prompt owns the quit flag of that loop and sets it once answered.
#[derive(Debug)]
pub struct Prompt {
    question: String,
    answer: Option<bool>,
    quit: QuitFlag,
}

impl Prompt {
    pub fn new(question: impl Into<String>, quit: QuitFlag) -> Self {
        Self {
            question: question.into(),
            answer: None,
            quit,
        }
    }

    #[inline]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[inline]
    pub fn answer(&self) -> Option<bool> {
        self.answer
    }

    /// Records the first answer and ends the loop. Later answers are ignored.
    pub fn answer_with(&mut self, yes: bool) {
        if self.answer.is_none() {
            self.answer = Some(yes);
            self.quit.set();
        }
    }
}

#[derive(Debug)]
pub struct Modes {
    stack: Vec<Mode>,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            stack: vec![Mode::Normal],
        }
    }
}

impl Modes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_mut(&mut self) -> Option<&mut Mode> {
        self.stack.last_mut()
    }

    #[inline]
    pub fn current_kind(&self) -> ModeKind {
        self.stack.last().map_or(ModeKind::Normal, Mode::kind)
    }

    /// The innermost normal or menu mode.
    pub fn primary_kind(&self) -> ModeKind {
        self.stack
            .iter()
            .rev()
            .map(Mode::kind)
            .find(|k| matches!(k, ModeKind::Normal | ModeKind::Menu))
            .unwrap_or(ModeKind::Normal)
    }

    pub fn push(&mut self, mode: Mode) {
        tracing::trace!(mode = ?mode.kind(), "enter mode");
        self.stack.push(mode);
    }

    /// Leaves the current mode. Normal mode at the bottom is never left.
    pub fn pop(&mut self) -> Option<Mode> {
        if self.stack.len() <= 1 {
            return None;
        }
        let mode = self.stack.pop();
        tracing::trace!(mode = ?mode.as_ref().map(Mode::kind), "leave mode");
        mode
    }

    /// The menu on top of the stack, if any. Used for drawing.
    pub fn menu(&self) -> Option<&Menu> {
        self.stack.iter().rev().find_map(|m| match m {
            Mode::Menu(menu) => Some(menu),
            _ => None,
        })
    }

    /// The command line being edited, if it is the current mode.
    pub fn cmdline(&self) -> Option<&CmdLine> {
        match self.stack.last() {
            Some(Mode::CmdLine(line)) => Some(line),
            _ => None,
        }
    }

    /// The pending question, if a prompt is the current mode.
    pub fn prompt(&self) -> Option<&Prompt> {
        match self.stack.last() {
            Some(Mode::Msg(prompt)) => Some(prompt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_and_current() {
        let mut modes = Modes::new();
        assert_eq!(modes.primary_kind(), ModeKind::Normal);

        modes.push(Mode::Menu(Menu::new("Jobs", vec!["a".into()])));
        modes.push(Mode::CmdLine(CmdLine::new()));
        assert_eq!(modes.current_kind(), ModeKind::CmdLine);
        assert_eq!(modes.primary_kind(), ModeKind::Menu);

        assert!(modes.pop().is_some());
        assert!(modes.pop().is_some());
        assert!(modes.pop().is_none());
        assert_eq!(modes.current_kind(), ModeKind::Normal);
    }

    #[test]
    fn prompt_answers_once() {
        let quit = QuitFlag::new();
        let mut prompt = Prompt::new("Delete?", quit.clone());
        prompt.answer_with(false);
        prompt.answer_with(true);
        assert_eq!(prompt.answer(), Some(false));
        assert!(quit.is_set());
    }

    #[test]
    fn menu_cursor_is_clamped() {
        let mut menu = Menu::new("m", vec!["a".into(), "b".into()]);
        menu.move_cursor(5);
        assert_eq!(menu.cursor(), 1);
        menu.move_cursor(-9);
        assert_eq!(menu.cursor(), 0);
    }
}
