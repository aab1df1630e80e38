//! Sorting, filtering and display formatting of pane entries.
//!
//! The [Formatter] applies the listing rules from the `[general]` config section.
//! The `format_*` helpers build the lines of the file info message.

use crate::core::fm::{FileEntry, FileInfo, FileType};

use chrono::{DateTime, Local};
use humansize::{DECIMAL, format_size};
use unicode_width::UnicodeWidthChar;

use std::fs::Metadata;
use std::time::SystemTime;

/// Listing rules of a pane.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    dirs_first: bool,
    show_hidden: bool,
    case_insensitive: bool,
}

impl Formatter {
    pub fn new(dirs_first: bool, show_hidden: bool, case_insensitive: bool) -> Self {
        Self {
            dirs_first,
            show_hidden,
            case_insensitive,
        }
    }

    pub fn sort_entries(&self, entries: &mut [FileEntry]) {
        entries.sort_by(|a, b| {
            if self.dirs_first {
                match (a.is_dir(), b.is_dir()) {
                    (true, false) => return std::cmp::Ordering::Less,
                    (false, true) => return std::cmp::Ordering::Greater,
                    _ => {}
                }
            }
            if self.case_insensitive {
                a.lowercase_name().cmp(b.lowercase_name())
            } else {
                a.name().cmp(b.name())
            }
        });
    }

    /// Drops hidden entries unless they are shown, then sorts what is left.
    pub fn filter_entries(&self, entries: &mut Vec<FileEntry>) {
        if !self.show_hidden {
            entries.retain(|e| !e.is_hidden());
        }
        self.sort_entries(entries);
    }
}

/// Unix-like permission string, e.g. `drwxr-xr-x`.
pub fn format_attributes(meta: &Metadata) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let file_type = meta.file_type();
        let first = if file_type.is_dir() {
            'd'
        } else if file_type.is_symlink() {
            'l'
        } else {
            '-'
        };
        let mode = meta.permissions().mode();
        let mut chars = [first, '-', '-', '-', '-', '-', '-', '-', '-', '-'];
        for (i, shift) in [6u32, 3, 0].into_iter().enumerate() {
            let base = 1 + i * 3;
            if (mode >> (shift + 2)) & 1 != 0 {
                chars[base] = 'r';
            }
            if (mode >> (shift + 1)) & 1 != 0 {
                chars[base + 1] = 'w';
            }
            if (mode >> shift) & 1 != 0 {
                chars[base + 2] = 'x';
            }
        }
        chars.iter().collect()
    }
    #[cfg(not(unix))]
    {
        let first = if meta.is_dir() { 'd' } else { '-' };
        let ro = if meta.permissions().readonly() { 'r' } else { '-' };
        [first, ro].iter().collect()
    }
}

pub fn format_file_type(file_type: FileType) -> &'static str {
    match file_type {
        FileType::File => "File",
        FileType::Directory => "Directory",
        FileType::Symlink => "Symlink",
        FileType::Other => "Other",
    }
}

/// Human readable size, or `-` for directories and unknown sizes.
pub fn format_file_size(size: Option<u64>, is_dir: bool) -> String {
    match size {
        Some(sz) if !is_dir => format_size(sz, DECIMAL),
        _ => "-".to_string(),
    }
}

pub fn format_file_time(modified: Option<SystemTime>) -> String {
    modified
        .map(|mtime| {
            let dt: DateTime<Local> = DateTime::from(mtime);
            dt.format("%Y-%m-%d %H:%M:%S").to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

/// Lines of the info message for one path.
pub fn format_info_lines(info: &FileInfo) -> Vec<String> {
    vec![
        format!("Name:     {}", info.name().to_string_lossy()),
        format!("Type:     {}", format_file_type(info.file_type())),
        format!(
            "Size:     {}",
            format_file_size(info.size(), info.file_type() == FileType::Directory)
        ),
        format!("Modified: {}", format_file_time(info.modified())),
        format!("Perms:    {}", info.attributes()),
    ]
}

/// Fits `line` into exactly `width` columns: control characters are dropped, tabs
/// expanded, and the result truncated or padded with spaces.
pub fn sanitize_to_exact_width(line: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut current_w = 0;

    for c in line.chars() {
        if c == '\t' {
            let space_count = 4 - (current_w % 4);
            if current_w + space_count > width {
                break;
            }
            out.extend(std::iter::repeat_n(' ', space_count));
            current_w += space_count;
            continue;
        }

        if c.is_control() {
            continue;
        }

        let w = c.width().unwrap_or(0);
        if current_w + w > width {
            break;
        }

        out.push(c);
        current_w += w;
    }

    if current_w < width {
        out.extend(std::iter::repeat_n(' ', width - current_w));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn entry(name: &str, dir: bool) -> FileEntry {
        let mut flags = if dir { FileEntry::IS_DIR } else { 0 };
        if name.starts_with('.') {
            flags |= FileEntry::IS_HIDDEN;
        }
        FileEntry::new(OsString::from(name), flags)
    }

    #[test]
    fn dirs_first_case_insensitive() {
        let mut entries = vec![
            entry("b.txt", false),
            entry("Zeta", true),
            entry("A.txt", false),
            entry(".git", true),
            entry("alpha", true),
        ];
        Formatter::new(true, false, true).filter_entries(&mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.name_str().into_owned()).collect();
        assert_eq!(names, ["alpha", "Zeta", "A.txt", "b.txt"]);
    }

    #[test]
    fn exact_width_pads_and_truncates() {
        use unicode_width::UnicodeWidthStr;
        for input in ["short", "very_long_filename.txt", "🦀_crab.rs", "\t_tab"] {
            let out = sanitize_to_exact_width(input, 10);
            assert_eq!(UnicodeWidthStr::width(out.as_str()), 10, "input {input:?}");
        }
    }

    #[test]
    fn size_is_dash_for_directories() {
        assert_eq!(format_file_size(Some(10), true), "-");
        assert_eq!(format_file_size(None, false), "-");
        assert!(format_file_size(Some(1000), false).ends_with("kB"));
    }
}
