//! Config tests for twinpane
//!
//! These tests load `twinpane.toml` snippets and check what the rest of the program
//! sees: loop timing, listing rules and the key bindings built from `[keys]`.

use twinpane::app::Command;
use twinpane::app::Keymap;
use twinpane::app::keymap::Resolution;
use twinpane::config::{Config, RawConfig};
use std::error;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_defaults_when_file_is_missing() -> Result<(), Box<dyn error::Error>> {
    let temp_dir = tempdir()?;
    let loaded = Config::load_from(&temp_dir.path().join("nope.toml"))?;
    assert!(loaded.is_none());

    let config = Config::default();
    let settings = config.general().loop_settings();
    assert_eq!(settings.timeout, Duration::from_millis(1000));
    assert_eq!(settings.min_slice, Duration::from_millis(150));
    assert_eq!(config.general().min_size(), (20, 5));
    Ok(())
}

#[test]
fn test_timeouts_from_file() -> Result<(), Box<dyn error::Error>> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("twinpane.toml");
    fs::write(
        &path,
        "[general]\ntimeout_len = 400\nmin_timeout_len = 50\nserver_name = \"left\"\n",
    )?;

    let config = Config::load_from(&path)?.ok_or("config not found")?;
    let settings = config.general().loop_settings();
    assert_eq!(settings.timeout, Duration::from_millis(400));
    assert_eq!(settings.min_slice, Duration::from_millis(50));
    assert_eq!(config.general().server_name(), "left");
    Ok(())
}

#[test]
fn test_custom_bindings_replace_defaults() -> Result<(), Box<dyn error::Error>> {
    let raw: RawConfig = toml::from_str(
        r#"
            [keys]
            quit = ["<C-q>"]
            delete = ["D", "<Del>"]
        "#,
    )?;
    let config = Config::from(raw);
    let keymap = Keymap::from_keys(config.keys());

    assert_eq!(
        keymap.resolve(&['\x11'], false),
        Resolution::Run {
            cmd: Command::Quit,
            count: None,
            len: 1
        }
    );
    assert_eq!(
        keymap.resolve(&['2', 'D'], false),
        Resolution::Run {
            cmd: Command::Delete,
            count: Some(2),
            len: 2
        }
    );
    // `q` and `dd` are no longer bound.
    assert_eq!(keymap.resolve(&['q'], false), Resolution::Discard(1));
    assert_eq!(keymap.resolve(&['d'], false), Resolution::Discard(1));
    // Untouched commands keep their defaults.
    assert_eq!(keymap.resolve(&['g'], false), Resolution::PendingShort);
    Ok(())
}
