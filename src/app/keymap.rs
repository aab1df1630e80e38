//! Normal mode key bindings and the sequence matcher behind them.
//!
//! Bindings are parsed from the `[keys]` section into character sequences, the same
//! characters the key buffer holds. [Keymap::resolve] looks at the front of the buffer
//! and decides whether a command can run, the keys must be dropped, or more input is
//! needed to tell bindings apart.

use crate::config::Keys;
use crate::core::keys::{self, BACK_TAB, BACKSPACE, ENTER, ESC, TAB};

/// Every command a normal mode binding can name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Open,
    GoParent,
    CursorUp,
    CursorDown,
    GoTop,
    GoBottom,
    GoHome,
    SwitchPane,
    ToggleSelect,
    ClearSelection,
    Delete,
    ShowInfo,
    Reload,
    CmdLine,
    Help,
    Jobs,
    Quit,
}

impl Command {
    pub fn description(self) -> &'static str {
        match self {
            Command::Open => "Enter directory or open file",
            Command::GoParent => "Go to parent directory",
            Command::CursorUp => "Move cursor up",
            Command::CursorDown => "Move cursor down",
            Command::GoTop => "Go to first entry (or entry [count])",
            Command::GoBottom => "Go to last entry",
            Command::GoHome => "Go to home directory",
            Command::SwitchPane => "Switch active pane",
            Command::ToggleSelect => "Toggle selection",
            Command::ClearSelection => "Clear selection",
            Command::Delete => "Delete selection",
            Command::ShowInfo => "Show file information",
            Command::Reload => "Reload pane",
            Command::CmdLine => "Command line",
            Command::Help => "Show key bindings",
            Command::Jobs => "Show background jobs",
            Command::Quit => "Quit",
        }
    }
}

/// What to do with the front of the key buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Run `cmd`, consuming `len` keys (count included).
    Run {
        cmd: Command,
        count: Option<usize>,
        len: usize,
    },
    /// Drop `len` keys that lead nowhere.
    Discard(usize),
    /// The keys may still become a binding; force them after the timeout.
    PendingShort,
    /// Only a count was typed; wait for the command without a deadline.
    PendingLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Match {
    None,
    Exact(Command),
    ExactPrefix(Command),
    Prefix,
}

#[derive(Debug, Clone)]
struct Binding {
    seq: Vec<char>,
    notation: String,
    cmd: Command,
}

#[derive(Debug, Default)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Keymap {
    /// Builds the keymap from the `[keys]` section. Sequences that fail to parse are
    /// logged and skipped; a sequence bound twice keeps its last command.
    #[rustfmt::skip]
    pub fn from_keys(keys: &Keys) -> Self {
        let mut keymap = Keymap::default();

        macro_rules! bind {
            ($list:expr, $cmd:expr) => {
                keymap.bind_all($list, $cmd);
            };
        }

        bind!(keys.open(),              Command::Open);
        bind!(keys.go_parent(),         Command::GoParent);
        bind!(keys.cursor_up(),         Command::CursorUp);
        bind!(keys.cursor_down(),       Command::CursorDown);
        bind!(keys.go_top(),            Command::GoTop);
        bind!(keys.go_bottom(),         Command::GoBottom);
        bind!(keys.go_home(),           Command::GoHome);
        bind!(keys.switch_pane(),       Command::SwitchPane);
        bind!(keys.toggle_select(),     Command::ToggleSelect);
        bind!(keys.clear_selection(),   Command::ClearSelection);
        bind!(keys.delete(),            Command::Delete);
        bind!(keys.show_info(),         Command::ShowInfo);
        bind!(keys.reload(),            Command::Reload);
        bind!(keys.cmdline(),           Command::CmdLine);
        bind!(keys.help(),              Command::Help);
        bind!(keys.jobs(),              Command::Jobs);
        bind!(keys.quit(),              Command::Quit);

        keymap
    }

    fn bind_all(&mut self, list: &[String], cmd: Command) {
        for notation in list {
            match parse_sequence(notation) {
                Some(seq) => self.bind(seq, notation, cmd),
                None => tracing::warn!(notation, ?cmd, "invalid key sequence in config"),
            }
        }
    }

    fn bind(&mut self, seq: Vec<char>, notation: &str, cmd: Command) {
        self.bindings.retain(|b| b.seq != seq);
        self.bindings.push(Binding {
            seq,
            notation: notation.to_string(),
            cmd,
        });
    }

    /// `(notation, description)` of every binding, in binding order.
    pub fn describe(&self) -> Vec<(String, &'static str)> {
        self.bindings
            .iter()
            .map(|b| (b.notation.clone(), b.cmd.description()))
            .collect()
    }

    fn lookup(&self, seq: &[char]) -> Match {
        let mut exact = None;
        let mut prefix = false;
        for b in &self.bindings {
            if b.seq == seq {
                exact = Some(b.cmd);
            } else if b.seq.len() > seq.len() && b.seq.starts_with(seq) {
                prefix = true;
            }
        }
        match (exact, prefix) {
            (Some(cmd), false) => Match::Exact(cmd),
            (Some(cmd), true) => Match::ExactPrefix(cmd),
            (None, true) => Match::Prefix,
            (None, false) => Match::None,
        }
    }

    /// Longest binding that `seq` starts with.
    fn longest_match(&self, seq: &[char]) -> Option<(usize, Command)> {
        self.bindings
            .iter()
            .filter(|b| seq.starts_with(&b.seq))
            .max_by_key(|b| b.seq.len())
            .map(|b| (b.seq.len(), b.cmd))
    }

    /// Decides what to do with the front of `keys`.
    ///
    /// With `forced` set the front is resolved without waiting: the longest complete
    /// binding runs, or a single key is dropped.
    pub fn resolve(&self, keys: &[char], forced: bool) -> Resolution {
        let (count, digits) = parse_count(keys);
        let rest = &keys[digits..];

        if rest.is_empty() {
            return if forced {
                Resolution::Discard(digits)
            } else {
                Resolution::PendingLong
            };
        }

        if forced {
            return match self.longest_match(rest) {
                Some((len, cmd)) => Resolution::Run {
                    cmd,
                    count,
                    len: digits + len,
                },
                None => Resolution::Discard(digits + 1),
            };
        }

        for n in 1..=rest.len() {
            match self.lookup(&rest[..n]) {
                Match::Exact(cmd) => {
                    return Resolution::Run {
                        cmd,
                        count,
                        len: digits + n,
                    };
                }
                Match::ExactPrefix(_) | Match::Prefix if n == rest.len() => {
                    return Resolution::PendingShort;
                }
                Match::ExactPrefix(_) | Match::Prefix => {}
                Match::None => break,
            }
        }

        // The keys went past every binding they could have started.
        match self.longest_match(rest) {
            Some((len, cmd)) => Resolution::Run {
                cmd,
                count,
                len: digits + len,
            },
            None => Resolution::Discard(digits + 1),
        }
    }
}

/// Leading count, vi style: a digit other than `0`, then any digits.
fn parse_count(keys: &[char]) -> (Option<usize>, usize) {
    if !matches!(keys.first(), Some('1'..='9')) {
        return (None, 0);
    }
    let digits = keys.iter().take_while(|c| c.is_ascii_digit()).count();
    let count = keys[..digits].iter().fold(0usize, |acc, c| {
        let d = c.to_digit(10).unwrap_or(0) as usize;
        acc.saturating_mul(10).saturating_add(d)
    });
    (Some(count), digits)
}

/// Parses vi-like key notation (`dd`, `<C-l>`, `<A-j>`, `<Space>`) into buffer characters.
pub fn parse_sequence(s: &str) -> Option<Vec<char>> {
    let mut seq = Vec::new();
    let mut rest = s;

    while let Some(c) = rest.chars().next() {
        if c == '<'
            && let Some(end) = rest.find('>')
            && end > 1
        {
            seq.extend(parse_bracketed(&rest[1..end])?);
            rest = &rest[end + 1..];
            continue;
        }
        seq.push(c);
        rest = &rest[c.len_utf8()..];
    }

    if seq.is_empty() { None } else { Some(seq) }
}

fn parse_bracketed(name: &str) -> Option<Vec<char>> {
    let lower = name.to_ascii_lowercase();

    if let Some(key) = lower.strip_prefix("c-") {
        let c = match key {
            "space" => ' ',
            _ => single_char(&name[2..])?,
        };
        return keys::ctrl(c).map(|c| vec![c]);
    }

    if lower.starts_with("a-") || lower.starts_with("m-") {
        let mut seq = vec![ESC];
        match single_char(&name[2..]) {
            Some(c) => seq.push(c),
            None => seq.push(named_key(&lower[2..])?),
        }
        return Some(seq);
    }

    named_key(&lower).map(|c| vec![c])
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn named_key(name: &str) -> Option<char> {
    let c = match name {
        "esc" => ESC,
        "cr" | "enter" | "return" => ENTER,
        "tab" => TAB,
        "s-tab" => BACK_TAB,
        "bs" | "backspace" => BACKSPACE,
        "space" => ' ',
        "lt" => '<',
        "up" => keys::UP,
        "down" => keys::DOWN,
        "left" => keys::LEFT,
        "right" => keys::RIGHT,
        "home" => keys::HOME,
        "end" => keys::END,
        "pageup" => keys::PAGE_UP,
        "pagedown" => keys::PAGE_DOWN,
        "del" | "delete" => keys::DELETE,
        "insert" => keys::INSERT,
        _ => {
            let n = name.strip_prefix('f')?.parse::<u8>().ok()?;
            return keys::f_key(n);
        }
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn keymap() -> Keymap {
        Keymap::from_keys(&Keys::default())
    }

    #[test]
    fn notation_parsing() {
        assert_eq!(parse_sequence("dd"), Some(chars("dd")));
        assert_eq!(parse_sequence("<Esc>"), Some(vec![ESC]));
        assert_eq!(parse_sequence("<C-l>"), Some(vec!['\x0c']));
        assert_eq!(parse_sequence("<A-J>"), Some(vec![ESC, 'J']));
        assert_eq!(parse_sequence("<m-up>"), Some(vec![ESC, keys::UP]));
        assert_eq!(parse_sequence("g<Space>"), Some(vec!['g', ' ']));
        assert_eq!(parse_sequence("<F12>"), keys::f_key(12).map(|c| vec![c]));
        assert_eq!(parse_sequence("<lt>"), Some(vec!['<']));
        assert_eq!(parse_sequence("<"), Some(vec!['<']));
        assert_eq!(parse_sequence("<nope>"), None);
        assert_eq!(parse_sequence(""), None);
    }

    #[test]
    fn lone_prefix_waits_and_is_dropped_on_timeout() {
        let map = keymap();
        assert_eq!(map.resolve(&chars("d"), false), Resolution::PendingShort);
        assert_eq!(map.resolve(&chars("d"), true), Resolution::Discard(1));
        assert_eq!(
            map.resolve(&chars("dd"), false),
            Resolution::Run {
                cmd: Command::Delete,
                count: None,
                len: 2
            }
        );
    }

    #[test]
    fn escape_is_exact_and_prefix() {
        let map = keymap();
        assert_eq!(map.resolve(&[ESC], false), Resolution::PendingShort);
        assert_eq!(
            map.resolve(&[ESC], true),
            Resolution::Run {
                cmd: Command::ClearSelection,
                count: None,
                len: 1
            }
        );
        assert_eq!(
            map.resolve(&[ESC, 'h'], false),
            Resolution::Run {
                cmd: Command::GoHome,
                count: None,
                len: 2
            }
        );
        // Escape followed by an unrelated key runs the short binding first.
        assert_eq!(
            map.resolve(&[ESC, 'x'], false),
            Resolution::Run {
                cmd: Command::ClearSelection,
                count: None,
                len: 1
            }
        );
    }

    #[test]
    fn counts() {
        let map = keymap();
        assert_eq!(map.resolve(&chars("12"), false), Resolution::PendingLong);
        assert_eq!(map.resolve(&chars("12"), true), Resolution::Discard(2));
        assert_eq!(
            map.resolve(&chars("12j"), false),
            Resolution::Run {
                cmd: Command::CursorDown,
                count: Some(12),
                len: 3
            }
        );
        assert_eq!(map.resolve(&chars("3g"), false), Resolution::PendingShort);
        // `0` does not start a count and is not bound.
        assert_eq!(map.resolve(&chars("0j"), false), Resolution::Discard(1));
    }

    #[test]
    fn unknown_keys_are_dropped_one_by_one() {
        let map = keymap();
        assert_eq!(map.resolve(&chars("xj"), false), Resolution::Discard(1));
        assert_eq!(map.resolve(&chars("dx"), false), Resolution::Discard(1));
    }

    #[test]
    fn sequence_bound_twice_keeps_last_command() -> Result<(), Box<dyn std::error::Error>> {
        let keys: Keys = toml::from_str("delete = [\"q\"]\nquit = [\"q\"]")?;
        let map = Keymap::from_keys(&keys);
        assert_eq!(
            map.resolve(&chars("q"), false),
            Resolution::Run {
                cmd: Command::Quit,
                count: None,
                len: 1
            }
        );
        assert_eq!(map.resolve(&chars("dd"), false), Resolution::Discard(1));
        Ok(())
    }
}
