//! Key dispatch and the commands it runs.
//!
//! [App::dispatch] is the key-dispatch engine the main loop talks to. In normal mode it
//! walks the buffer with the [Keymap](crate::app::keymap::Keymap); every other mode
//! takes keys one at a time. Commands are plain methods on [App] and may run a nested
//! main loop (the delete confirmation).

use crate::app::App;
use crate::app::cmdline::{self, CmdLine, LineCommand};
use crate::app::keymap::{Command, Resolution};
use crate::app::modes::{Menu, Mode, Prompt};
use crate::core::fm::FileInfo;
use crate::core::formatter::format_info_lines;
use crate::core::keys::{self, BACKSPACE, ENTER, ESC};
use crate::core::{self, DispatchOutcome, ModeKind, ModeLayer, QuitFlag, ScheduledEvent};
use crate::core::{StatusEcho, TermControl, ViewLayer, proc};
use crate::utils::{describe_paths, get_home, resolve_path};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Private Use Area range the functional keys are mapped into.
const FUNCTIONAL_KEYS: std::ops::RangeInclusive<char> = '\u{E000}'..='\u{F8FF}';

impl App {
    /// Resolves as much of `keys` as possible.
    ///
    /// With `timed_out` set the first ambiguous prefix is forced instead of reported as
    /// pending; the rest of the buffer is handled normally.
    pub(crate) fn dispatch(&mut self, keys: &[char], timed_out: bool) -> DispatchOutcome {
        let mut pos = 0;
        let mut forced = timed_out;

        while pos < keys.len() {
            let rest = &keys[pos..];
            if self.modes.current_kind() == ModeKind::Normal {
                match self.keymap.resolve(rest, forced) {
                    Resolution::Run { cmd, count, len } => {
                        pos += len;
                        self.execute(cmd, count);
                    }
                    Resolution::Discard(len) => {
                        tracing::trace!(keys = ?&rest[..len], "unmapped keys dropped");
                        pos += len;
                    }
                    Resolution::PendingShort => return DispatchOutcome::pending_short(pos),
                    Resolution::PendingLong => return DispatchOutcome::pending_long(pos),
                }
            } else {
                self.handle_modal_key(rest[0]);
                pos += 1;
            }
            forced = false;
        }
        DispatchOutcome::consumed(pos)
    }

    fn handle_modal_key(&mut self, c: char) {
        match self.modes.current_mut() {
            Some(Mode::CmdLine(line)) => match c {
                ENTER => {
                    let input = line.take();
                    self.modes.pop();
                    self.run_command_line(&input);
                }
                ESC => {
                    self.modes.pop();
                }
                BACKSPACE | '\x08' => {
                    if !line.backspace() {
                        self.modes.pop();
                    }
                }
                c if !c.is_control() && !FUNCTIONAL_KEYS.contains(&c) => line.push(c),
                _ => {}
            },
            Some(Mode::Menu(menu)) => match c {
                'j' | keys::DOWN => menu.move_cursor(1),
                'k' | keys::UP => menu.move_cursor(-1),
                'g' | keys::HOME => menu.move_cursor(isize::MIN),
                'G' | keys::END => menu.move_cursor(isize::MAX),
                ESC | ENTER | 'q' => {
                    self.modes.pop();
                }
                _ => {}
            },
            Some(Mode::Msg(prompt)) => match c {
                'y' | 'Y' => prompt.answer_with(true),
                'n' | 'N' | ESC => prompt.answer_with(false),
                _ => {}
            },
            Some(Mode::Normal) | None => {}
        }
        self.dirty = true;
    }

    /// Runs one normal mode command.
    pub(crate) fn execute(&mut self, cmd: Command, count: Option<usize>) {
        tracing::debug!(?cmd, ?count, "command");
        let steps = count.map_or(1, |n| isize::try_from(n).unwrap_or(isize::MAX));

        match cmd {
            Command::CursorDown => self.active_pane_mut().move_cursor(steps),
            Command::CursorUp => self.active_pane_mut().move_cursor(-steps),
            Command::GoTop => {
                let idx = count.map_or(0, |n| n.saturating_sub(1));
                self.active_pane_mut().go_to(idx);
            }
            Command::GoBottom => match count {
                Some(n) => self.active_pane_mut().go_to(n.saturating_sub(1)),
                None => self.active_pane_mut().go_bottom(),
            },
            Command::Open => self.open_entry(),
            Command::GoParent => self.go_parent(),
            Command::GoHome => match get_home() {
                Some(home) => self.cd(home),
                None => self.report_error("No home directory"),
            },
            Command::SwitchPane => self.active = 1 - self.active,
            Command::ToggleSelect => {
                for _ in 0..count.unwrap_or(1) {
                    let pane = self.active_pane_mut();
                    pane.toggle_select();
                    let before = pane.cursor();
                    pane.move_cursor(1);
                    if pane.cursor() == before {
                        break;
                    }
                }
            }
            Command::ClearSelection => {
                self.active_pane_mut().clear_selection();
                if !self.is_pinned() {
                    self.clear_message();
                }
            }
            Command::Delete => self.delete_targets(),
            Command::ShowInfo => self.show_info(),
            Command::Reload => {
                self.active_pane_mut().schedule(ScheduledEvent::Reload);
                self.redraw_requested = true;
            }
            Command::CmdLine => self.modes.push(Mode::CmdLine(CmdLine::new())),
            Command::Help => self.show_help(),
            Command::Jobs => self.show_jobs(),
            Command::Quit => self.request_quit(),
        }

        self.update_ruler();
        self.dirty = true;
    }

    /// Executes a finished command line, typed or received over IPC.
    pub fn run_command_line(&mut self, line: &str) {
        let command = match cmdline::parse(line) {
            Ok(command) => command,
            Err(e) => return self.report_error(&e),
        };

        match command {
            LineCommand::Empty => {}
            LineCommand::Quit => self.request_quit(),
            LineCommand::Cd(arg) => {
                let target = resolve_path(self.active_pane().dir(), &arg);
                self.cd(target);
            }
            LineCommand::Shell(cmd) => {
                let cwd = self.active_pane().dir().to_path_buf();
                match self.jobs.spawn(&cmd, &cwd) {
                    Ok(id) => self.report(&format!("Job {id} started: {cmd}")),
                    Err(e) => self.report_error(&format!("Cannot start '{cmd}': {e}")),
                }
            }
            LineCommand::Echo(text) => self.report(&text),
            LineCommand::Jobs => self.show_jobs(),
        }
        self.update_ruler();
        self.dirty = true;
    }

    /// Ends the top-level loop. An open prompt is answered with "no" first.
    fn request_quit(&mut self) {
        if let Some(Mode::Msg(prompt)) = self.modes.current_mut() {
            prompt.answer_with(false);
        }
        self.quit.set();
    }

    /// Asks a yes/no question in a nested main loop. Anything but "yes" is "no".
    pub(crate) fn confirm(&mut self, question: &str) -> bool {
        let quit = QuitFlag::new();
        self.modes.push(Mode::Msg(Prompt::new(question, quit.clone())));
        self.dirty = true;

        let result = core::run(self, &quit);

        let answer = match self.modes.pop() {
            Some(Mode::Msg(prompt)) => prompt.answer(),
            Some(other) => {
                tracing::warn!(mode = ?other.kind(), "unexpected mode after prompt");
                self.modes.push(other);
                None
            }
            None => None,
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "prompt loop failed");
        }
        self.dirty = true;
        answer.unwrap_or(false)
    }

    fn cd(&mut self, dir: PathBuf) {
        let fmt = self.formatter;
        if let Err(e) = self.active_pane_mut().change_dir(dir.clone(), &fmt, None) {
            self.report_error(&format!("Cannot open {}: {e}", dir.display()));
        }
    }

    fn go_parent(&mut self) {
        let fmt = self.formatter;
        if let Err(e) = self.active_pane_mut().go_parent(&fmt) {
            self.report_error(&format!("Cannot open parent directory: {e}"));
        }
    }

    fn open_entry(&mut self) {
        let Some(entry) = self.active_pane().cursor_entry() else {
            return;
        };
        let is_dir = entry.is_dir();
        let Some(path) = self.active_pane().cursor_path() else {
            return;
        };

        if is_dir {
            self.cd(path);
        } else {
            self.open_in_editor(&path);
        }
    }

    fn open_in_editor(&mut self, path: &Path) {
        let editor = self.config.editor();
        if !editor.exists() {
            let msg = format!("Editor '{}' not found", editor.cmd());
            return self.report_error(&msg);
        }
        let program = editor.cmd();

        if let Err(e) = self.detach() {
            tracing::warn!(error = %e, "failed to detach terminal for editor");
        }
        let status = proc::run_foreground(&program, path);
        if let Err(e) = self.restore() {
            tracing::warn!(error = %e, "failed to restore terminal after editor");
        }
        self.redraw_all();

        match status {
            Ok(status) if !status.success() => {
                self.report_error(&format!("{program} exited with {status}"));
            }
            Ok(_) => {}
            Err(e) => self.report_error(&format!("Cannot run {program}: {e}")),
        }
        self.active_pane_mut().schedule(ScheduledEvent::Reload);
    }

    fn delete_targets(&mut self) {
        self.active_pane_mut().select_cursor_temporarily();
        let targets = self.active_pane().targets();
        if targets.is_empty() {
            return self.report_error("Nothing to delete");
        }

        let to_trash = self.config.general().move_to_trash();
        let (verb, done) = if to_trash {
            ("Trash", "Trashed")
        } else {
            ("Delete", "Deleted")
        };
        let question = format!("{verb} {}? [y/n]", describe_paths(&targets));
        if !self.confirm(&question) {
            return self.report("Delete cancelled");
        }

        let result = if to_trash {
            trash::delete_all(&targets).map_err(|e| e.to_string())
        } else {
            remove_paths(&targets).map_err(|e| e.to_string())
        };

        match result {
            Ok(()) => {
                tracing::info!(count = targets.len(), to_trash, "deleted");
                self.report(&format!("{done} {}", describe_paths(&targets)));
            }
            Err(e) => self.report_error(&format!("{verb} failed: {e}")),
        }

        self.active_pane_mut().clear_selection();
        for pane in &mut self.panes {
            pane.schedule(ScheduledEvent::Reload);
        }
    }

    fn show_info(&mut self) {
        let Some(path) = self.active_pane().cursor_path() else {
            return;
        };
        match FileInfo::get_file_info(&path) {
            Ok(info) => self.show_message(&format_info_lines(&info).join("\n")),
            Err(e) => self.report_error(&format!("Cannot stat {}: {e}", path.display())),
        }
    }

    fn show_help(&mut self) {
        let items = self
            .keymap
            .describe()
            .into_iter()
            .map(|(keys, what)| format!("{keys:<12} {what}"))
            .collect();
        self.modes.push(Mode::Menu(Menu::new("Key bindings", items)));
    }

    fn show_jobs(&mut self) {
        let items: Vec<String> = self
            .jobs
            .jobs()
            .iter()
            .map(|job| {
                let state = if job.is_running() { "running" } else { "done" };
                format!("{:>3} {:<8} {}", job.id(), state, job.cmd())
            })
            .collect();
        // Finished jobs are listed once.
        self.jobs.prune();

        if items.is_empty() {
            return self.report("No background jobs");
        }
        self.modes.push(Mode::Menu(Menu::new("Jobs", items)));
    }
}

/// Permanently removes `paths`. Directories go with everything inside them.
fn remove_paths(paths: &[PathBuf]) -> io::Result<()> {
    for path in paths {
        let meta = fs::symlink_metadata(path)?;
        if meta.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::KeyDispatcher;
    use std::error;
    use std::fs::File;
    use tempfile::{TempDir, tempdir};

    fn app_in(dir: &TempDir) -> Result<App, Box<dyn error::Error>> {
        Ok(App::new(Config::default(), dir.path())?)
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn cursor_name(app: &App) -> Option<String> {
        app.active_pane()
            .cursor_entry()
            .map(|e| e.name_str().into_owned())
    }

    #[test]
    fn counts_move_the_cursor() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        for name in ["a", "b", "c", "d"] {
            File::create(dir.path().join(name))?;
        }
        let mut app = app_in(&dir)?;

        let outcome = app.submit(&chars("2j"));
        assert_eq!(outcome, DispatchOutcome::consumed(2));
        assert_eq!(cursor_name(&app).as_deref(), Some("c"));
        assert_eq!(app.ruler(), "3/4");

        assert_eq!(app.submit(&chars("G")), DispatchOutcome::consumed(1));
        assert_eq!(cursor_name(&app).as_deref(), Some("d"));
        assert_eq!(app.submit(&chars("1")), DispatchOutcome::pending_long(0));
        assert_eq!(app.submit(&chars("gg")), DispatchOutcome::consumed(2));
        assert_eq!(cursor_name(&app).as_deref(), Some("a"));
        Ok(())
    }

    #[test]
    fn prefix_reports_consumed_part() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        File::create(dir.path().join("a"))?;
        let mut app = app_in(&dir)?;

        assert_eq!(app.submit(&chars("jd")), DispatchOutcome::pending_short(1));
        assert_eq!(app.submit_timed_out(&chars("d")), DispatchOutcome::consumed(1));
        assert!(dir.path().join("a").exists());
        Ok(())
    }

    #[test]
    fn command_line_keys_are_consumed_one_by_one() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let mut app = app_in(&dir)?;

        let outcome = app.submit(&chars(":echo hi"));
        assert_eq!(outcome, DispatchOutcome::consumed(8));
        assert_eq!(app.current_mode(), ModeKind::CmdLine);
        assert_eq!(app.modes().cmdline().map(CmdLine::input), Some("echo hi"));

        app.submit(&[ENTER]);
        assert_eq!(app.current_mode(), ModeKind::Normal);
        assert_eq!(app.status().message(), "hi");

        app.submit(&chars(":q"));
        app.submit(&[ENTER]);
        assert!(app.is_quitting());
        Ok(())
    }

    #[test]
    fn echo_with_newline_is_multiline() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let mut app = app_in(&dir)?;
        app.run_command_line(r"echo one\ntwo");
        assert!(app.is_multiline());
        Ok(())
    }

    #[test]
    fn cd_changes_active_pane_only() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("sub"))?;
        let mut app = app_in(&dir)?;

        app.run_command_line("cd sub");
        assert_eq!(app.active_pane().dir(), dir.path().join("sub"));
        assert_eq!(app.panes()[1].dir(), dir.path());

        app.run_command_line("cd nope");
        assert!(app.status().is_error());
        assert_eq!(app.active_pane().dir(), dir.path().join("sub"));

        app.submit(&[keys::TAB]);
        assert_eq!(app.active_dir(), dir.path());
        Ok(())
    }

    #[test]
    fn help_menu_opens_and_closes() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let mut app = app_in(&dir)?;

        app.submit(&chars("?"));
        assert!(app.is_menu_like());
        assert!(app.modes().menu().is_some_and(|m| !m.items().is_empty()));

        app.submit(&chars("jjq"));
        assert!(!app.is_menu_like());
        Ok(())
    }

    #[test]
    fn info_is_a_multiline_message() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        File::create(dir.path().join("notes.txt"))?;
        let mut app = app_in(&dir)?;

        app.submit(&chars("ga"));
        assert!(app.is_multiline());
        assert!(app.status().message().contains("notes.txt"));
        Ok(())
    }

    #[test]
    fn toggle_select_moves_down() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        for name in ["a", "b", "c"] {
            File::create(dir.path().join(name))?;
        }
        let mut app = app_in(&dir)?;

        app.submit(&chars("2t"));
        assert_eq!(app.active_pane().selection_len(), 2);
        assert_eq!(cursor_name(&app).as_deref(), Some("c"));

        app.submit_timed_out(&[ESC]);
        assert!(!app.active_has_selection());
        Ok(())
    }

    #[test]
    fn permanent_delete_removes_files_and_dirs() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let sub = dir.path().join("sub");
        fs::create_dir(&sub)?;
        File::create(sub.join("inner"))?;
        let file = dir.path().join("file");
        File::create(&file)?;

        remove_paths(&[sub.clone(), file.clone()])?;
        assert!(!sub.exists());
        assert!(!file.exists());
        assert!(remove_paths(&[file]).is_err());
        Ok(())
    }
}
