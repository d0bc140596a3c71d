//! Path enumeration shared by the read-only commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// One file to check, remembering whether the user named it directly or it
/// was found inside a directory argument. Directly named files get louder
/// error reporting.
#[derive(Debug, Clone)]
pub struct FileArg {
    pub path: PathBuf,
    pub explicit: bool,
}

/// Expand file and directory arguments into a flat list of regular files.
/// Directories are walked recursively in file-name order. A path that is
/// neither a file nor a directory is an error.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<FileArg>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(FileArg {
                path: path.clone(),
                explicit: true,
            });
        } else if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("failed to walk {}", path.display()))?;
                if entry.file_type().is_file() {
                    files.push(FileArg {
                        path: entry.into_path(),
                        explicit: false,
                    });
                }
            }
        } else {
            anyhow::bail!("no such file or directory: {}", path.display());
        }
    }
    Ok(files)
}

/// Read a file as UTF-8 text. `Ok(None)` means unreadable content inside a
/// walk (binary files in a tree are simply not artifacts); errors on
/// explicitly named files are left to the caller.
pub fn read_text(file: &FileArg) -> std::io::Result<Option<String>> {
    match std::fs::read_to_string(&file.path) {
        Ok(text) => Ok(Some(text)),
        Err(_) if !file.explicit => Ok(None),
        Err(e) => Err(e),
    }
}
