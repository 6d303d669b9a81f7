//! Deletion-list processor
//!
//! Walks a named path list in order, removing whatever still exists.
//! Continue-on-error throughout: one failing entry never blocks the rest,
//! and the aggregate outcome is a summary only, without identifying which
//! entry failed.

use crate::fsops;
use crate::registry::PathList;
use crate::volume::Volume;

/// Counts for one processed list.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeleteOutcome {
    pub deleted: usize,
    pub failed: usize,
}

impl DeleteOutcome {
    /// The list result is OK iff nothing failed.
    pub fn is_clean(self) -> bool {
        self.failed == 0
    }
}

/// Delete every existing entry of `list`, in list order.
///
/// Missing entries are skipped; a "not found" surfacing mid-delete (a
/// nested deletion already took the entry) counts as success. Entry type is
/// probed here, not tagged in the list.
pub fn delete_path_list(volume: &Volume, list: &PathList) -> DeleteOutcome {
    let mut outcome = DeleteOutcome::default();

    for rel in &list.paths {
        if !volume.exists(rel) {
            continue;
        }
        let path = volume.resolve(rel);
        let result = if volume.is_directory(rel) {
            fsops::remove_tree(&path)
        } else {
            fsops::remove_file(&path)
        };
        match result {
            Ok(()) => outcome.deleted += 1,
            Err(_) => outcome.failed += 1,
        }
    }

    outcome
}
