//! File enumeration under a store root

use crate::error::StorageError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// List files under `root` whose name ends with `suffix`, sorted by path.
///
/// Hidden files and directories are skipped. `max_depth` of 1 lists only the
/// files directly under `root`.
pub fn list_files(root: &Path, suffix: &str, max_depth: usize) -> Result<Vec<PathBuf>, StorageError> {
    if !root.is_dir() {
        return Err(StorageError::NotFound(format!(
            "store root {}",
            root.display()
        )));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth.max(1))
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            match e.into_io_error() {
                Some(io) => StorageError::from_io(path, io),
                None => StorageError::IllegalOperation(format!(
                    "filesystem loop at {}",
                    path.display()
                )),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .map(|name| name.len() > suffix.len() && name.ends_with(suffix))
            .unwrap_or(false);
        if matches {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
