//! Shared file system primitives with the tolerance rules the install flow
//! relies on: "already exists" is fine when creating a directory, "not
//! found" is fine when deleting.

use std::fs;
use std::io;
use std::path::Path;

/// Create a directory, tolerating pre-existence.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(_) if path.is_dir() => Ok(()),
        Err(err) => Err(err),
    }
}

/// Remove a directory tree, treating an already-absent path as success.
pub fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Remove a single file, treating an already-absent path as success.
pub fn remove_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Bulk copy of the tree at `src` under `dst_root`, recreating `src`'s final
/// path component underneath it. No progress reporting; this is the backup
/// manager's workhorse and the copy engine's fallback.
pub fn copy_tree(src: &Path, dst_root: &Path) -> io::Result<()> {
    let name = src.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("source path has no final component: {}", src.display()),
        )
    })?;
    copy_dir_recursive(src, &dst_root.join(name))
}

/// Copy a directory's contents into `dst`, creating it first.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let entry_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if entry_path.is_dir() {
            copy_dir_recursive(&entry_path, &dst_path)?;
        } else {
            fs::copy(&entry_path, &dst_path)?;
        }
    }

    Ok(())
}
