//! Published input buffers.
//!
//! The status bar shows the keys of the sequence that is still being typed. Each
//! running loop publishes its own buffer here; a nested loop (a confirmation dialog
//! for instance) pushes a fresh frame and pops it on exit, so the outer loop finds its
//! echo exactly as it left it.

/// Identity of one published frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

#[derive(Debug)]
struct EchoFrame {
    id: FrameId,
    keys: String,
}

#[derive(Debug, Default)]
pub struct InputEcho {
    frames: Vec<EchoFrame>,
    next_id: u64,
}

impl InputEcho {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a new, empty frame on top of the current one.
    pub fn enter(&mut self) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.frames.push(EchoFrame {
            id,
            keys: String::new(),
        });
        id
    }

    /// Unpublishes `id` and everything pushed above it.
    pub fn leave(&mut self, id: FrameId) {
        if let Some(pos) = self.frames.iter().rposition(|f| f.id == id) {
            debug_assert_eq!(pos + 1, self.frames.len(), "echo frames left unbalanced");
            self.frames.truncate(pos);
        }
    }

    #[inline]
    pub fn current_frame(&self) -> Option<FrameId> {
        self.frames.last().map(|f| f.id)
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Text shown in the input bar: the keys of the innermost frame.
    pub fn current(&self) -> &str {
        self.frames.last().map_or("", |f| f.keys.as_str())
    }

    pub fn is_input_empty(&self) -> bool {
        self.current().is_empty()
    }

    pub fn publish(&mut self, keys: &[char]) {
        if let Some(frame) = self.frames.last_mut() {
            frame.keys.clear();
            frame.keys.extend(keys.iter().copied().map(printable));
        }
    }

    pub fn clear(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.keys.clear();
        }
    }
}

/// Control characters are shown in caret notation.
fn printable(c: char) -> char {
    match c {
        '\x1b' => '^',
        c if c.is_control() => '?',
        c => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_frames_restore_outer() {
        let mut echo = InputEcho::new();
        let outer = echo.enter();
        echo.publish(&['d', '2']);

        let inner = echo.enter();
        assert!(echo.is_input_empty());
        echo.publish(&['y']);
        assert_eq!(echo.current(), "y");
        echo.leave(inner);

        assert_eq!(echo.current_frame(), Some(outer));
        assert_eq!(echo.current(), "d2");
        echo.leave(outer);
        assert_eq!(echo.depth(), 0);
        assert_eq!(echo.current(), "");
    }

    #[test]
    fn clear_only_touches_top() {
        let mut echo = InputEcho::new();
        let outer = echo.enter();
        echo.publish(&['g']);
        let inner = echo.enter();
        echo.publish(&['x']);
        echo.clear();
        echo.leave(inner);
        assert_eq!(echo.current(), "g");
        echo.leave(outer);
    }

    #[test]
    fn escape_is_shown_as_caret() {
        let mut echo = InputEcho::new();
        let _frame = echo.enter();
        echo.publish(&['\x1b']);
        assert_eq!(echo.current(), "^");
    }
}
