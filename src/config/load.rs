//! Loading of `twinpane.toml`.
//!
//! The file is deserialized into [RawConfig] and converted into the [Config] the rest of
//! the program uses. A missing file means defaults; a broken one means defaults plus an
//! error in the log.

use crate::config::{Editor, General, InternalGeneral, Keys};
use crate::error::{Error, Result};

use serde::Deserialize;
use std::{fs, io, path::Path, path::PathBuf};

/// Configuration exactly as written in the toml file.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RawConfig {
    general: General,
    editor: Editor,
    keys: Keys,
}

#[derive(Debug)]
pub struct Config {
    general: InternalGeneral,
    editor: Editor,
    keys: Keys,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: InternalGeneral::from(raw.general),
            editor: raw.editor,
            keys: raw.keys,
        }
    }
}

impl Config {
    /// Loads the config from [Config::default_path], falling back to defaults.
    pub fn load() -> Self {
        let path = Self::default_path();
        match Self::load_from(&path) {
            Ok(Some(config)) => {
                tracing::info!(path = %path.display(), "config loaded");
                config
            }
            Ok(None) => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::error!(error = %e, "using default config");
                Self::default()
            }
        }
    }

    /// Reads and parses `path`. A missing file is `Ok(None)`.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let raw = toml::from_str::<RawConfig>(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(raw.into()))
    }

    #[inline]
    pub fn general(&self) -> &InternalGeneral {
        &self.general
    }

    #[inline]
    pub fn general_mut(&mut self) -> &mut InternalGeneral {
        &mut self.general
    }

    #[inline]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    #[inline]
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// `$TWINPANE_CONFIG`, else `$XDG_CONFIG_HOME/twinpane/twinpane.toml` (or the
    /// platform config dir), else `twinpane.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("TWINPANE_CONFIG") {
            return PathBuf::from(path);
        }

        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("twinpane/twinpane.toml");
        }

        if let Some(dir) = dirs::config_dir() {
            return dir.join("twinpane/twinpane.toml");
        }
        PathBuf::from("twinpane.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        RawConfig::default().into()
    }
}
