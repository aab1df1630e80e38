//! Directory panes.
//!
//! A [Pane] holds one directory listing with its cursor, selection and the deferred
//! update the main loop will apply to it. Panes never touch the terminal; the app
//! decides when to redraw them.

use crate::core::fm::{browse_dir, dir_mtime, entry_path};
use crate::core::formatter::Formatter;
use crate::core::{FileEntry, ScheduledEvent};

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug)]
pub struct Pane {
    dir: PathBuf,
    entries: Vec<FileEntry>,
    cursor: usize,
    selected: HashSet<OsString>,
    scheduled: ScheduledEvent,
    user_selection: bool,
    mtime: Option<SystemTime>,
    positions: HashMap<PathBuf, OsString>,
}

impl Pane {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            entries: Vec::new(),
            cursor: 0,
            selected: HashSet::new(),
            scheduled: ScheduledEvent::None,
            user_selection: true,
            mtime: None,
            positions: HashMap::new(),
        }
    }

    // Getters / Accessors

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[inline]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn is_selected(&self, entry: &FileEntry) -> bool {
        self.selected.contains(entry.name())
    }

    #[inline]
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    #[inline]
    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    pub fn cursor_entry(&self) -> Option<&FileEntry> {
        self.entries.get(self.cursor)
    }

    pub fn cursor_path(&self) -> Option<PathBuf> {
        self.cursor_entry().map(|e| entry_path(&self.dir, e))
    }

    /// `current/total` shown next to the input echo.
    pub fn ruler(&self) -> String {
        if self.entries.is_empty() {
            "0/0".to_string()
        } else {
            format!("{}/{}", self.cursor + 1, self.entries.len())
        }
    }

    // Loading

    /// Re-reads the directory.
    ///
    /// With `preserve_position` the cursor stays on the entry it was on (or as close
    /// as the new listing allows) and selected entries that still exist stay selected.
    /// Otherwise the cursor goes back to the top and the selection is dropped.
    pub fn load(&mut self, fmt: &Formatter, preserve_position: bool) -> io::Result<()> {
        let focus = self.cursor_entry().map(|e| e.name().to_os_string());

        let mut entries = browse_dir(&self.dir)?;
        fmt.filter_entries(&mut entries);
        self.mtime = dir_mtime(&self.dir);
        self.entries = entries;

        if preserve_position {
            let entries = &self.entries;
            self.selected
                .retain(|name| entries.iter().any(|e| e.name() == name.as_os_str()));
            self.cursor = focus
                .and_then(|name| self.position_of(&name))
                .unwrap_or_else(|| self.cursor.min(self.entries.len().saturating_sub(1)));
        } else {
            self.selected.clear();
            self.cursor = 0;
        }
        Ok(())
    }

    /// Switches to `dir`. The pane is left untouched if `dir` cannot be read.
    ///
    /// The cursor lands on `focus` if given, else where it was when `dir` was last left.
    pub fn change_dir(
        &mut self,
        dir: PathBuf,
        fmt: &Formatter,
        focus: Option<OsString>,
    ) -> io::Result<()> {
        let mut entries = browse_dir(&dir)?;
        fmt.filter_entries(&mut entries);

        if let Some(name) = self.cursor_entry().map(|e| e.name().to_os_string()) {
            self.positions.insert(self.dir.clone(), name);
        }

        self.mtime = dir_mtime(&dir);
        self.dir = dir;
        self.entries = entries;
        self.selected.clear();
        self.user_selection = true;
        self.scheduled = ScheduledEvent::None;

        let focus = focus.or_else(|| self.positions.get(&self.dir).cloned());
        self.cursor = focus.and_then(|n| self.position_of(&n)).unwrap_or(0);
        Ok(())
    }

    /// Goes one directory up and puts the cursor on the directory just left.
    /// Returns `false` at the root.
    pub fn go_parent(&mut self, fmt: &Formatter) -> io::Result<bool> {
        let Some(parent) = self.dir.parent().map(Path::to_path_buf) else {
            return Ok(false);
        };
        let focus = self.dir.file_name().map(|n| n.to_os_string());
        self.change_dir(parent, fmt, focus)?;
        Ok(true)
    }

    /// Moves to the closest ancestor that can still be listed, after the directory
    /// disappeared. Returns the directory the pane ended up in.
    pub fn leave_to_existing_ancestor(&mut self, fmt: &Formatter) -> Option<PathBuf> {
        let mut candidate = self.dir.parent().map(Path::to_path_buf);
        while let Some(dir) = candidate {
            if self.change_dir(dir.clone(), fmt, None).is_ok() {
                return Some(dir);
            }
            candidate = dir.parent().map(Path::to_path_buf);
        }
        None
    }

    fn position_of(&self, name: &OsString) -> Option<usize> {
        self.entries.iter().position(|e| e.name() == name.as_os_str())
    }

    // Cursor

    pub fn move_cursor(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let last = self.entries.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn go_to(&mut self, idx: usize) {
        self.cursor = idx.min(self.entries.len().saturating_sub(1));
    }

    pub fn go_bottom(&mut self) {
        self.cursor = self.entries.len().saturating_sub(1);
    }

    // Selection

    /// Toggles the entry under the cursor. Returns whether it is selected now.
    pub fn toggle_select(&mut self) -> bool {
        let Some(name) = self.cursor_entry().map(|e| e.name().to_os_string()) else {
            return false;
        };
        self.user_selection = true;
        if self.selected.remove(&name) {
            false
        } else {
            self.selected.insert(name);
            true
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Selects the entry under the cursor for the duration of one command, unless the
    /// user already selected something.
    pub fn select_cursor_temporarily(&mut self) {
        if self.has_selection() {
            return;
        }
        if let Some(name) = self.cursor_entry().map(|e| e.name().to_os_string()) {
            self.selected.insert(name);
            self.user_selection = false;
        }
    }

    /// Marks the selection as user made. A temporary selection is dropped.
    pub fn set_user_selection(&mut self, user: bool) {
        if user && !self.user_selection {
            self.selected.clear();
        }
        self.user_selection = user;
    }

    /// Paths a command should act on: the selection in listing order, else the cursor.
    pub fn targets(&self) -> Vec<PathBuf> {
        if self.selected.is_empty() {
            return self.cursor_path().into_iter().collect();
        }
        self.entries
            .iter()
            .filter(|e| self.is_selected(e))
            .map(|e| entry_path(&self.dir, e))
            .collect()
    }

    // Scheduled updates

    /// Schedules `event`, keeping whatever stronger event is already pending.
    pub fn schedule(&mut self, event: ScheduledEvent) {
        if rank(event) > rank(self.scheduled) {
            self.scheduled = event;
        }
    }

    pub fn take_scheduled(&mut self) -> ScheduledEvent {
        std::mem::take(&mut self.scheduled)
    }

    /// Schedules a reload if the directory changed since it was last read.
    pub fn check_for_changes(&mut self) -> bool {
        if dir_mtime(&self.dir) == self.mtime {
            return false;
        }
        tracing::debug!(dir = %self.dir.display(), "directory changed on disk");
        self.schedule(ScheduledEvent::Reload);
        true
    }
}

fn rank(event: ScheduledEvent) -> u8 {
    match event {
        ScheduledEvent::None => 0,
        ScheduledEvent::Redraw => 1,
        ScheduledEvent::Reload => 2,
        ScheduledEvent::FullReload => 3,
    }
}
