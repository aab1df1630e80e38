//! Application state and its role as the main loop's [Host].
//!
//! [App] owns everything the loop drives: the two panes, the mode stack, the status
//! line with the input echo, background jobs, the IPC server and the terminal. The
//! collaborator traits from [crate::core::host] are all implemented here, in one
//! place, so the loop sees a single `&mut App`.
//!
//! The terminal is optional. Without one the app still dispatches keys, loads panes
//! and runs commands, which is what the unit tests rely on.

use crate::app::keymap::Keymap;
use crate::app::modes::Modes;
use crate::app::pane::Pane;
use crate::config::Config;
use crate::core::formatter::Formatter;
use crate::core::ipc::IpcServer;
use crate::core::jobs::BgJobs;
use crate::core::proc;
use crate::core::terminal::Tui;
use crate::core::{
    DispatchOutcome, Host, InputEcho, Ipc, Jobs, KeyDispatcher, LoopSettings, ModeKind,
    ModeLayer, ProcessControl, QuitFlag, ScheduledEvent, Side, StatusEcho, TermControl,
    TerminalState, ViewLayer,
};
use crate::error::Result;
use crate::ui;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The message line at the bottom of the screen.
#[derive(Debug, Default)]
pub struct StatusLine {
    message: String,
    pinned: bool,
    error: bool,
    notice: bool,
}

impl StatusLine {
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.error
    }

    #[inline]
    pub fn is_multiline(&self) -> bool {
        self.message.contains('\n')
    }

    fn set(&mut self, msg: &str, error: bool) {
        self.message.clear();
        self.message.push_str(msg);
        self.error = error;
        self.notice = false;
    }

    fn clear(&mut self) {
        self.message.clear();
        self.error = false;
        self.notice = false;
    }
}

pub struct App {
    pub(super) config: Config,
    pub(super) keymap: Keymap,
    pub(super) formatter: Formatter,

    pub(super) panes: [Pane; 2],
    pub(super) active: usize,
    pub(super) modes: Modes,

    pub(super) status: StatusLine,
    pub(super) echo: InputEcho,
    pub(super) ruler: String,

    pub(super) jobs: BgJobs,
    pub(super) ipc: Option<IpcServer>,
    pub(super) tui: Option<Tui>,

    pub(super) quit: QuitFlag,
    pub(super) redraw_requested: bool,
    pub(super) dirty: bool,
    pub(super) clear_before_draw: bool,
    cwd: Option<PathBuf>,
}

impl App {
    /// Creates the app with both panes showing `start_dir`.
    pub fn new(config: Config, start_dir: &Path) -> Result<Self> {
        let general = config.general();
        let formatter = Formatter::new(
            general.dirs_first(),
            general.show_hidden(),
            general.case_insensitive(),
        );

        let mut panes = [
            Pane::new(start_dir.to_path_buf()),
            Pane::new(start_dir.to_path_buf()),
        ];
        for pane in &mut panes {
            pane.load(&formatter, false)?;
        }

        let mut app = Self {
            keymap: Keymap::from_keys(config.keys()),
            config,
            formatter,
            panes,
            active: 0,
            modes: Modes::new(),
            status: StatusLine::default(),
            echo: InputEcho::new(),
            ruler: String::new(),
            jobs: BgJobs::new(),
            ipc: None,
            tui: None,
            quit: QuitFlag::new(),
            redraw_requested: false,
            dirty: true,
            clear_before_draw: false,
            cwd: None,
        };
        app.update_ruler();
        Ok(app)
    }

    /// Attaches the terminal the app draws on and reads keys from.
    pub fn with_tui(mut self, tui: Tui) -> Self {
        self.tui = Some(tui);
        self
    }

    /// Flag that ends the top-level loop.
    pub fn quit_flag(&self) -> QuitFlag {
        self.quit.clone()
    }

    /// Starts the IPC server (if enabled) and paints the first frame.
    pub fn start(&mut self) {
        let general = self.config.general();
        if general.ipc() {
            match IpcServer::start(general.server_name()) {
                Ok(server) => self.ipc = Some(server),
                Err(e) => tracing::warn!(error = %e, "IPC server not started"),
            }
        }
        self.redraw_all();
    }

    /// Stops the IPC server and hands the terminal back.
    pub fn shutdown(&mut self) {
        self.ipc = None;
        if let Some(tui) = self.tui.as_mut()
            && let Err(e) = tui.detach()
        {
            tracing::error!(error = %e, "failed to restore terminal");
        }
        tracing::info!(jobs_running = self.jobs.running(), "shutting down");
    }

    // Getters / Accessors

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    #[inline]
    pub fn panes(&self) -> &[Pane; 2] {
        &self.panes
    }

    #[inline]
    pub fn active_index(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn active_pane(&self) -> &Pane {
        &self.panes[self.active]
    }

    #[inline]
    pub(super) fn active_pane_mut(&mut self) -> &mut Pane {
        &mut self.panes[self.active]
    }

    #[inline]
    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    #[inline]
    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    #[inline]
    pub fn echo(&self) -> &InputEcho {
        &self.echo
    }

    #[inline]
    pub fn ruler(&self) -> &str {
        &self.ruler
    }

    #[inline]
    pub fn jobs(&self) -> &BgJobs {
        &self.jobs
    }

    #[inline]
    pub fn is_quitting(&self) -> bool {
        self.quit.is_set()
    }

    pub(super) fn side_index(&self, side: Side) -> usize {
        match side {
            Side::Active => self.active,
            Side::Other => 1 - self.active,
        }
    }

    // Status helpers

    /// Shows the result of a command, pinned until the next key.
    pub(super) fn report(&mut self, msg: &str) {
        self.status.set(msg, false);
        self.status.pinned = true;
        self.dirty = true;
    }

    pub(super) fn report_error(&mut self, msg: &str) {
        tracing::debug!(msg, "error reported");
        self.status.set(msg, true);
        self.status.pinned = true;
        self.dirty = true;
    }

    // Drawing

    /// Draws a frame if anything changed since the last one.
    pub(super) fn render_if_dirty(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let Some(mut tui) = self.tui.take() else {
            return;
        };
        if tui.state() == TerminalState::TooSmall {
            self.tui = Some(tui);
            return;
        }

        if std::mem::take(&mut self.clear_before_draw)
            && let Err(e) = tui.terminal_mut().clear()
        {
            tracing::warn!(error = %e, "failed to clear terminal");
        }
        let drawn = tui
            .terminal_mut()
            .draw(|frame| ui::render(frame, self))
            .map(|_| ());
        self.tui = Some(tui);

        if let Err(e) = drawn {
            tracing::warn!(error = %e, "failed to draw frame");
        }
    }
}

impl KeyDispatcher for App {
    fn submit(&mut self, keys: &[char]) -> DispatchOutcome {
        self.dispatch(keys, false)
    }

    fn submit_timed_out(&mut self, keys: &[char]) -> DispatchOutcome {
        self.dispatch(keys, true)
    }
}

impl ModeLayer for App {
    fn pre(&mut self) {
        self.render_if_dirty();
    }

    fn post(&mut self) {
        if self.modes.current_kind() != ModeKind::Normal {
            return;
        }
        if self.status.notice && !self.active_has_selection() {
            self.status.clear();
        }
        self.update_ruler();
    }

    fn redraw_all(&mut self) {
        self.dirty = true;
        self.clear_before_draw = true;
        self.render_if_dirty();
    }

    fn is_menu_like(&self) -> bool {
        self.modes.primary_kind() == ModeKind::Menu
    }

    fn primary_mode(&self) -> ModeKind {
        self.modes.primary_kind()
    }

    fn current_mode(&self) -> ModeKind {
        self.modes.current_kind()
    }
}

impl ViewLayer for App {
    fn take_redraw_request(&mut self) -> bool {
        let resized = self.tui.as_mut().is_some_and(Tui::take_resized);
        std::mem::take(&mut self.redraw_requested) || resized
    }

    fn shows_dirlist(&self, _side: Side) -> bool {
        true
    }

    fn take_scheduled_event(&mut self, side: Side) -> ScheduledEvent {
        let idx = self.side_index(side);
        self.panes[idx].take_scheduled()
    }

    fn redraw_view(&mut self, _side: Side) {
        self.dirty = true;
    }

    fn reload(&mut self, side: Side, preserve_position: bool) {
        let idx = self.side_index(side);
        let fmt = self.formatter;
        self.dirty = true;

        let Err(e) = self.panes[idx].load(&fmt, preserve_position) else {
            return;
        };
        let dir = self.panes[idx].dir().to_path_buf();
        tracing::warn!(dir = %dir.display(), error = %e, "pane reload failed");

        match self.panes[idx].leave_to_existing_ancestor(&fmt) {
            Some(now) => self.report_error(&format!(
                "{} is gone, moved to {}",
                dir.display(),
                now.display()
            )),
            None => self.report_error(&format!("Cannot read {}: {e}", dir.display())),
        }
    }

    fn update_ruler(&mut self) {
        let ruler = self.active_pane().ruler();
        if ruler != self.ruler {
            self.ruler = ruler;
            self.dirty = true;
        }
    }

    fn check_for_changes(&mut self, side: Side) {
        let idx = self.side_index(side);
        self.panes[idx].check_for_changes();
    }

    fn set_user_selection(&mut self, user: bool) {
        for pane in &mut self.panes {
            pane.set_user_selection(user);
        }
    }

    fn active_has_selection(&self) -> bool {
        self.active_pane().has_selection()
    }

    fn show_selection_notice(&mut self) {
        let n = self.active_pane().selection_len();
        let msg = format!("{n} item{} selected", if n == 1 { "" } else { "s" });
        self.status.set(&msg, false);
        self.status.notice = true;
        self.dirty = true;
    }

    fn active_dir(&self) -> PathBuf {
        self.active_pane().dir().to_path_buf()
    }
}

impl StatusEcho for App {
    fn input_echo(&mut self) -> &mut InputEcho {
        &mut self.echo
    }

    fn refresh_input_bar(&mut self) {
        self.dirty = true;
    }

    fn is_multiline(&self) -> bool {
        self.status.is_multiline()
    }

    fn is_pinned(&self) -> bool {
        self.status.pinned
    }

    fn set_pinned(&mut self, pinned: bool) {
        self.status.pinned = pinned;
    }

    fn show_message(&mut self, msg: &str) {
        self.status.set(msg, false);
        self.dirty = true;
    }

    fn clear_message(&mut self) {
        self.status.clear();
        self.dirty = true;
    }
}

impl Jobs for App {
    fn poll_jobs(&mut self) {
        let finished = self.jobs.poll();
        let Some(last) = finished.last() else {
            return;
        };

        let msg = match (last.success, last.code) {
            (true, _) => format!("Job {} finished: {}", last.id, last.cmd),
            (false, Some(code)) => format!("Job {} failed ({code}): {}", last.id, last.cmd),
            (false, None) => format!("Job {} killed: {}", last.id, last.cmd),
        };
        if last.success {
            self.report(&msg);
        } else {
            self.report_error(&msg);
        }

        for pane in &mut self.panes {
            pane.schedule(ScheduledEvent::Reload);
        }
    }
}

impl Ipc for App {
    fn ipc_enabled(&self) -> bool {
        self.config.general().ipc()
    }

    fn ipc_has_listener(&self) -> bool {
        self.ipc.is_some()
    }

    fn poll_ipc(&mut self) {
        let Some(server) = &self.ipc else {
            return;
        };

        let mut lines = Vec::new();
        let stopped = loop {
            match server.try_recv() {
                Ok(Some(line)) => lines.push(line),
                Ok(None) => break None,
                Err(e) => break Some(e),
            }
        };
        if let Some(e) = stopped {
            tracing::warn!(error = %e, "IPC server stopped, remote commands disabled");
            self.ipc = None;
        }

        for line in lines {
            tracing::debug!(line, "IPC command");
            self.run_command_line(&line);
        }
    }
}

impl TermControl for App {
    fn refresh_terminal_state(&mut self) -> TerminalState {
        self.tui
            .as_mut()
            .map_or(TerminalState::Normal, Tui::refresh_state)
    }

    fn set_terminal_state(&mut self, state: TerminalState) {
        if let Some(tui) = self.tui.as_mut() {
            tui.set_state(state);
        }
    }

    fn show_too_small(&mut self) {
        if let Some(tui) = self.tui.as_mut()
            && let Err(e) = tui.show_too_small()
        {
            tracing::warn!(error = %e, "failed to draw size notice");
        }
    }

    fn wait_for_wake(&mut self) -> Result<()> {
        match self.tui.as_mut() {
            Some(tui) => tui.wait_for_resize(),
            None => Ok(()),
        }
    }

    fn read_key(&mut self, timeout: Duration) -> Result<Option<char>> {
        self.render_if_dirty();
        match self.tui.as_mut() {
            Some(tui) => tui.read_key(timeout),
            None => Ok(None),
        }
    }

    fn drain_input(&mut self) -> Result<()> {
        match self.tui.as_mut() {
            Some(tui) => tui.drain(),
            None => Ok(()),
        }
    }

    fn detach(&mut self) -> Result<()> {
        match self.tui.as_mut() {
            Some(tui) => tui.detach(),
            None => Ok(()),
        }
    }

    fn restore(&mut self) -> Result<()> {
        self.clear_before_draw = true;
        self.dirty = true;
        match self.tui.as_mut() {
            Some(tui) => tui.attach(),
            None => Ok(()),
        }
    }
}

impl ProcessControl for App {
    fn suspend_self_and_group(&mut self) -> io::Result<()> {
        proc::stop_process_group()
    }

    fn change_dir(&mut self, path: &Path) -> io::Result<()> {
        if self.cwd.as_deref() == Some(path) {
            return Ok(());
        }
        std::env::set_current_dir(path)?;
        self.cwd = Some(path.to_path_buf());
        Ok(())
    }
}

impl Host for App {
    fn loop_settings(&self) -> LoopSettings {
        self.config.general().loop_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error;
    use tempfile::tempdir;

    #[test]
    fn stopped_ipc_server_is_dropped() -> std::result::Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let mut app = App::new(Config::default(), dir.path())?;
        app.ipc = Some(IpcServer::stopped(&format!("app-{}", std::process::id())));
        assert!(app.ipc_has_listener());

        app.poll_ipc();
        assert!(!app.ipc_has_listener());
        app.poll_ipc();
        Ok(())
    }
}
