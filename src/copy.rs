//! Progress-tracked recursive copy engine
//!
//! Two tiers: the primary copy pre-scans the source tree for an item count
//! and reports throttled progress while descending; if it fails, a plain
//! bulk copy of the same tree runs as a fallback and, when that succeeds,
//! the primary failure is suppressed from the caller's perspective.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{InstallError, Result};
use crate::fsops;
use crate::progress::ProgressSink;

/// Transient counters scoped to one copy invocation.
struct CopyProgress {
    copied: usize,
    total: usize,
    last_reported_percent: Option<usize>,
}

impl CopyProgress {
    fn new(total: usize) -> Self {
        Self {
            copied: 0,
            total,
            last_reported_percent: None,
        }
    }

    fn percent(&self) -> usize {
        if self.total > 0 {
            self.copied * 100 / self.total
        } else {
            0
        }
    }

    /// Count one visited node and maybe redraw. Redraws are throttled to
    /// every 10th item, and then only if the percentage moved or the count
    /// hit a multiple of 50.
    fn advance(&mut self, label: &str, sink: &mut dyn ProgressSink) {
        self.copied += 1;
        if self.copied % 10 != 0 && self.total != 0 {
            return;
        }
        let percent = self.percent();
        if Some(percent) != self.last_reported_percent || self.copied % 50 == 0 {
            sink.copy_progress(label, percent, self.copied, self.total);
            self.last_reported_percent = Some(percent);
        }
    }
}

/// Count every file and directory node under `root`, recursively.
pub fn count_tree_items(root: &Path) -> usize {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .count()
}

/// Copy the tree at `src` under `dst_root`, recreating `src`'s final path
/// component underneath it and reporting progress through `sink`.
///
/// A missing source returns `NotFound`; callers installing optional trees
/// treat that as a skip. On primary failure the bulk fallback runs, and its
/// success becomes the caller's success; if it also fails, the original
/// error is returned.
pub fn copy_tree_with_progress(
    src: &Path,
    dst_root: &Path,
    label: &str,
    sink: &mut dyn ProgressSink,
) -> Result<()> {
    if !src.exists() {
        sink.copy_skipped(label);
        return Err(InstallError::NotFound {
            path: src.display().to_string(),
        });
    }

    let total = count_tree_items(src);
    if total == 0 {
        // No bar for an empty tree; just materialize the destination
        // directory and report completion.
        let dst = dst_root.join(tree_name(src)?);
        create_tree_dir(&dst)?;
        sink.copy_finished(label, 0, 0);
        return Ok(());
    }

    sink.copy_started(label, total);
    let mut progress = CopyProgress::new(total);

    match copy_level(src, dst_root, label, &mut progress, sink) {
        Ok(()) => {
            sink.copy_finished(label, progress.copied, total);
            Ok(())
        }
        Err(err) => {
            sink.copy_failed(label, &err, src, dst_root);
            sink.warn("Trying fallback copy method...");
            match fsops::copy_tree(src, dst_root) {
                Ok(()) => {
                    sink.success("Fallback copy succeeded");
                    Ok(())
                }
                Err(_) => Err(err),
            }
        }
    }
}

fn tree_name(src: &Path) -> Result<&std::ffi::OsStr> {
    src.file_name().ok_or_else(|| InstallError::Io {
        message: format!("source path has no final component: {}", src.display()),
    })
}

/// Destination directory creation tolerates "already exists" but rejects an
/// existing file of the same name.
fn create_tree_dir(dst: &Path) -> Result<()> {
    match fs::create_dir(dst) {
        Ok(()) => Ok(()),
        Err(_) if dst.is_dir() => Ok(()),
        Err(_) if dst.exists() => Err(InstallError::DestinationConflict {
            path: dst.display().to_string(),
        }),
        Err(err) => Err(InstallError::from_io(dst, err)),
    }
}

fn copy_level(
    src: &Path,
    dst: &Path,
    label: &str,
    progress: &mut CopyProgress,
    sink: &mut dyn ProgressSink,
) -> Result<()> {
    let dst_dir = dst.join(tree_name(src)?);
    create_tree_dir(&dst_dir)?;

    for entry in fs::read_dir(src).map_err(|err| InstallError::from_io(src, err))? {
        let entry = entry.map_err(|err| InstallError::from_io(src, err))?;
        let entry_path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|err| InstallError::from_io(&entry_path, err))?;

        if file_type.is_dir() {
            copy_level(&entry_path, &dst_dir, label, progress, sink)?;
            // The directory node itself was part of the pre-scan total.
            progress.advance(label, sink);
        } else {
            let dst_file = dst_dir.join(entry.file_name());
            fs::copy(&entry_path, &dst_file).map_err(|err| InstallError::CopyFailed {
                src: entry_path.display().to_string(),
                dst: dst_file.display().to_string(),
                reason: err.to_string(),
            })?;
            progress.advance(label, sink);
        }
    }

    Ok(())
}
