//! Directory listing for the panes.
//!
//! Provides the [FileEntry] struct shown in every pane, the [FileInfo] summary used by
//! the info message, and [dir_mtime] which the panes use to notice external changes.

use crate::core::formatter::format_attributes;

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fs::{self, symlink_metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A single entry in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    name: Box<OsStr>,
    lowercase_name: Box<str>,
    flags: u8,
}

impl FileEntry {
    pub(super) const IS_DIR: u8 = 1 << 0;
    pub(super) const IS_HIDDEN: u8 = 1 << 1;
    pub(super) const IS_SYMLINK: u8 = 1 << 2;
    pub(super) const IS_BROKEN_SYM: u8 = 1 << 3;
    pub(super) const IS_EXECUTABLE: u8 = 1 << 4;

    #[cfg(unix)]
    const EXEC_FLAG: u32 = 0o111;

    pub fn new(name: OsString, flags: u8) -> Self {
        let lowercase_name = name.to_string_lossy().to_lowercase().into_boxed_str();
        FileEntry {
            name: name.into_boxed_os_str(),
            lowercase_name,
            flags,
        }
    }

    #[inline]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    #[inline]
    pub fn name_str(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    #[inline]
    pub fn lowercase_name(&self) -> &str {
        &self.lowercase_name
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.flags & Self::IS_DIR != 0
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.flags & Self::IS_HIDDEN != 0
    }

    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.flags & Self::IS_SYMLINK != 0
    }

    #[inline]
    pub fn is_broken_sym(&self) -> bool {
        self.flags & Self::IS_BROKEN_SYM != 0
    }

    #[inline]
    pub fn is_executable(&self) -> bool {
        self.flags & Self::IS_EXECUTABLE != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
    Other,
}

/// Summary of a single path shown by the info command.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    name: OsString,
    size: Option<u64>,
    modified: Option<SystemTime>,
    attributes: String,
    file_type: FileType,
}

impl FileInfo {
    #[inline]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    #[inline]
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    #[inline]
    pub fn attributes(&self) -> &str {
        &self.attributes
    }

    #[inline]
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn get_file_info(path: &Path) -> io::Result<FileInfo> {
        let metadata = symlink_metadata(path)?;
        let file_type = if metadata.is_file() {
            FileType::File
        } else if metadata.is_dir() {
            FileType::Directory
        } else if metadata.file_type().is_symlink() {
            FileType::Symlink
        } else {
            FileType::Other
        };

        Ok(FileInfo {
            name: path.file_name().unwrap_or_default().to_os_string(),
            size: metadata.is_file().then(|| metadata.len()),
            modified: metadata.modified().ok(),
            attributes: format_attributes(&metadata),
            file_type,
        })
    }
}

/// Modification time of a directory, used to detect changes made by other programs.
pub fn dir_mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Reads the contents of `path`, unsorted and unfiltered.
pub fn browse_dir(path: &Path) -> io::Result<Vec<FileEntry>> {
    let mut entries = Vec::with_capacity(256);

    for entry in fs::read_dir(path)? {
        let Ok(entry) = entry else { continue };
        let Ok(ft) = entry.file_type() else { continue };
        let name = entry.file_name();

        let mut flags = 0u8;
        if ft.is_dir() {
            flags |= FileEntry::IS_DIR;
        }
        if ft.is_symlink() {
            flags |= FileEntry::IS_SYMLINK;
        }

        let md_res = if ft.is_symlink() {
            fs::metadata(entry.path())
        } else {
            entry.metadata()
        };

        match md_res {
            Ok(md) => {
                if md.is_dir() {
                    flags |= FileEntry::IS_DIR;
                }
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    if !md.is_dir() && md.permissions().mode() & FileEntry::EXEC_FLAG != 0 {
                        flags |= FileEntry::IS_EXECUTABLE;
                    }
                }
            }
            Err(_) if ft.is_symlink() => flags |= FileEntry::IS_BROKEN_SYM,
            Err(_) => {}
        }

        if name.to_string_lossy().starts_with('.') {
            flags |= FileEntry::IS_HIDDEN;
        }

        entries.push(FileEntry::new(name, flags));
    }
    Ok(entries)
}

/// Joins a pane directory with an entry name.
pub fn entry_path(dir: &Path, entry: &FileEntry) -> PathBuf {
    dir.join(entry.name())
}
