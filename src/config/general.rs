//! The `[general]` section.
//!
//! [General] is what the toml file holds; [InternalGeneral] is the validated form the
//! rest of the program reads, including the [LoopSettings] of the main loop.

use crate::core::ipc::DEFAULT_SERVER_NAME;
use crate::core::host::LoopSettings;

use serde::Deserialize;

use std::time::Duration;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct General {
    timeout_len: u64,
    min_timeout_len: u64,
    dirs_first: bool,
    show_hidden: bool,
    case_insensitive: bool,
    move_to_trash: bool,
    min_width: u16,
    min_height: u16,
    ipc: bool,
    server_name: String,
}

impl Default for General {
    fn default() -> Self {
        General {
            timeout_len: LoopSettings::DEFAULT_TIMEOUT_MS,
            min_timeout_len: LoopSettings::DEFAULT_MIN_SLICE_MS,
            dirs_first: true,
            show_hidden: false,
            case_insensitive: true,
            move_to_trash: true,
            min_width: 20,
            min_height: 5,
            ipc: true,
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct InternalGeneral {
    loop_settings: LoopSettings,
    dirs_first: bool,
    show_hidden: bool,
    case_insensitive: bool,
    move_to_trash: bool,
    min_size: (u16, u16),
    ipc: bool,
    server_name: String,
}

impl From<General> for InternalGeneral {
    fn from(g: General) -> Self {
        // A zero timeout would turn every prefix into a forced resolution.
        let timeout_len = g.timeout_len.max(1);
        let min_timeout_len = g.min_timeout_len.clamp(1, timeout_len);
        if min_timeout_len != g.min_timeout_len {
            tracing::warn!(
                configured = g.min_timeout_len,
                used = min_timeout_len,
                "min_timeout_len clamped into 1..=timeout_len"
            );
        }

        let server_name = match g.server_name.trim() {
            "" => DEFAULT_SERVER_NAME.to_string(),
            name => name.to_string(),
        };

        Self {
            loop_settings: LoopSettings {
                timeout: Duration::from_millis(timeout_len),
                min_slice: Duration::from_millis(min_timeout_len),
                ..LoopSettings::default()
            },
            dirs_first: g.dirs_first,
            show_hidden: g.show_hidden,
            case_insensitive: g.case_insensitive,
            move_to_trash: g.move_to_trash,
            min_size: (g.min_width.max(1), g.min_height.max(1)),
            ipc: g.ipc,
            server_name,
        }
    }
}

impl InternalGeneral {
    #[inline]
    pub fn loop_settings(&self) -> LoopSettings {
        self.loop_settings
    }

    #[inline]
    pub fn dirs_first(&self) -> bool {
        self.dirs_first
    }

    #[inline]
    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    #[inline]
    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    #[inline]
    pub fn move_to_trash(&self) -> bool {
        self.move_to_trash
    }

    #[inline]
    pub fn min_size(&self) -> (u16, u16) {
        self.min_size
    }

    #[inline]
    pub fn ipc(&self) -> bool {
        self.ipc
    }

    #[inline]
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Overrides the server name, e.g. from `--server-name`.
    pub fn set_server_name(&mut self, name: &str) {
        if !name.trim().is_empty() {
            self.server_name = name.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_clamped() -> Result<(), Box<dyn std::error::Error>> {
        let raw: General = toml::from_str("timeout_len = 0\nmin_timeout_len = 500")?;
        let general = InternalGeneral::from(raw);
        let settings = general.loop_settings();
        assert_eq!(settings.timeout, Duration::from_millis(1));
        assert_eq!(settings.min_slice, Duration::from_millis(1));
        assert_eq!(settings.buffer_capacity, LoopSettings::BUFFER_CAPACITY);
        Ok(())
    }

    #[test]
    fn blank_server_name_falls_back() -> Result<(), Box<dyn std::error::Error>> {
        let raw: General = toml::from_str("server_name = '  '")?;
        let mut general = InternalGeneral::from(raw);
        assert_eq!(general.server_name(), DEFAULT_SERVER_NAME);
        general.set_server_name("left");
        assert_eq!(general.server_name(), "left");
        Ok(())
    }
}
