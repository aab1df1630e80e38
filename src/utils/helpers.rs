//! Helpers for twinpane.
//!
//! Path utilities shared by the panes, the command line and the UI:
//! - Displaying the home directory as "~"
//! - Expanding a leading "~" in typed paths
//! - Resolving typed paths against the active directory
//! - Describing a set of paths in one short line

use std::path::{MAIN_SEPARATOR, Path, PathBuf};

pub fn get_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Shortens the home directory prefix of `path` to `~`.
pub fn shorten_home_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    if let Some(home_dir) = get_home()
        && let Ok(stripped) = path.strip_prefix(&home_dir)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~{}{}", MAIN_SEPARATOR, stripped.display());
    }
    path.display().to_string()
}

/// Expands `~` and `~/...` to the home directory. Other input is returned as is.
pub fn expand_home_path(input: &str) -> PathBuf {
    if input == "~" {
        return get_home().unwrap_or_else(|| PathBuf::from(input));
    }
    if let Some(rest) = input.strip_prefix("~/")
        && let Some(home) = get_home()
    {
        return home.join(rest);
    }
    PathBuf::from(input)
}

/// Resolves a path typed by the user relative to `base`.
pub fn resolve_path(base: &Path, input: &str) -> PathBuf {
    let expanded = expand_home_path(input.trim());
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// `'name'` for a single path, `N items` otherwise.
pub fn describe_paths(paths: &[PathBuf]) -> String {
    match paths {
        [one] => format!(
            "'{}'",
            one.file_name()
                .map_or_else(|| one.display().to_string(), |n| n.to_string_lossy().into_owned())
        ),
        many => format!("{} items", many.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_and_absolute_paths() {
        let base = Path::new("/srv/data");
        assert_eq!(resolve_path(base, "logs"), PathBuf::from("/srv/data/logs"));
        assert_eq!(resolve_path(base, " /etc "), PathBuf::from("/etc"));
        assert_eq!(resolve_path(base, ".."), PathBuf::from("/srv/data/.."));
    }

    #[test]
    fn home_round_trip() {
        let Some(home) = get_home() else {
            return;
        };
        assert_eq!(expand_home_path("~"), home);
        assert_eq!(shorten_home_path(&home), "~");
        let docs = expand_home_path("~/docs");
        assert_eq!(docs, home.join("docs"));
        assert_eq!(shorten_home_path(&docs), format!("~{MAIN_SEPARATOR}docs"));
    }

    #[test]
    fn describes_paths() {
        assert_eq!(describe_paths(&[PathBuf::from("/a/b.txt")]), "'b.txt'");
        assert_eq!(
            describe_paths(&[PathBuf::from("/a"), PathBuf::from("/b")]),
            "2 items"
        );
    }
}
