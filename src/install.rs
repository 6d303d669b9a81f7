//! Installation orchestration
//!
//! The top-level state machine. Detection picked a mode; each step must
//! return OK (or a tolerated code) before the next runs, the first fatal
//! failure halts the run, and completed steps are never rolled back.
//! Ordering is load-bearing: deletion before copy keeps stale files from
//! shadowing new ones, backup must precede the wipe, and restore must
//! precede the final copy pass so its stale-file pruning is not undone.

use std::fmt;
use std::path::Path;

use crate::backup::BackupManager;
use crate::copy;
use crate::delete;
use crate::error::{InstallError, Result};
use crate::fsops;
use crate::manifest::{self, InstallationStatus, PackVariant};
use crate::progress::ProgressSink;
use crate::registry::{PathList, Registry};
use crate::volume::Volume;

/// Trees transferred from the staging root for every variant, in order.
const PACK_TREES: [&str; 5] = [
    "atmosphere",
    "bootloader",
    "config",
    "switch",
    "warmboot_mariko",
];
/// Extra payload transferred only for the OC variant.
const OC_EXTRA_TREE: &str = "SaltySD";
/// Loose files copied from the staging root to the volume root when present.
const PACK_ROOT_FILES: [&str; 6] = [
    "boot.dat",
    "boot.ini",
    "exosphere.ini",
    "hbmenu.nro",
    "loader.bin",
    "payload.bin",
];
/// Directories removed outright by the clean-mode wipe.
const WIPE_TREES: [&str; 4] = ["atmosphere", "bootloader", "config", "switch"];
/// Recreated empty after the wipe; the restore step populates it.
const PLACEHOLDER_DIR: &str = "switch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    Update,
    Clean,
}

impl InstallMode {
    /// Update when a prior installation was detected, Clean otherwise.
    pub fn from_status(status: &InstallationStatus) -> Self {
        if status.is_installed {
            InstallMode::Update
        } else {
            InstallMode::Clean
        }
    }
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallMode::Update => write!(f, "Update"),
            InstallMode::Clean => write!(f, "Clean install"),
        }
    }
}

/// Outcome of a completed run: the tolerated failures that did not halt it.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstallReport {
    pub errors: usize,
}

/// Drives one installation run against a volume.
pub struct Installer<'a> {
    volume: &'a Volume,
    registry: &'a Registry,
    sink: &'a mut dyn ProgressSink,
    errors: usize,
}

impl<'a> Installer<'a> {
    pub fn new(
        volume: &'a Volume,
        registry: &'a Registry,
        sink: &'a mut dyn ProgressSink,
    ) -> Self {
        Self {
            volume,
            registry,
            sink,
            errors: 0,
        }
    }

    /// Run the state machine for the selected mode.
    pub fn run(&mut self, variant: PackVariant, mode: InstallMode) -> Result<InstallReport> {
        match mode {
            InstallMode::Update => {
                self.sink.section("Step 1: Cleaning up...");
                self.update_cleanup();
                self.sink.section("Step 2: Copying files...");
                self.install_pack(variant)?;
                self.cleanup_staging(variant)?;
            }
            InstallMode::Clean => {
                self.sink.section("Step 1: Backing up user data...");
                self.backup()?;
                self.sink.section("Step 2: Wiping old installation...");
                self.wipe()?;
                self.sink.section("Step 3: Restoring user data...");
                self.restore()?;
                self.sink.section("Step 4: Copying files...");
                self.install_pack(variant)?;
                self.cleanup_staging(variant)?;
            }
        }

        Ok(InstallReport {
            errors: self.errors,
        })
    }

    /// Run one deletion list, folding failures into the run's error count.
    fn run_list(&mut self, list: &PathList) {
        if let Some(section) = &list.section {
            self.sink.info(&format!("Cleaning: {section}"));
        }
        let outcome = delete::delete_path_list(self.volume, list);
        if !outcome.is_clean() {
            self.sink.warn(&format!(
                "{} entries in list '{}' could not be deleted",
                outcome.failed, list.name
            ));
            self.errors += outcome.failed;
        }
    }

    /// Update-mode cleanup: every registry list, strictly in declared
    /// order. List failures are logged and counted, never escalated.
    fn update_cleanup(&mut self) {
        let registry = self.registry;
        for list in &registry.update_cleanup {
            self.run_list(list);
        }
        self.sink.success("Cleanup finished");
    }

    fn backup(&mut self) -> Result<()> {
        self.sink.info("Saving: DBI, tinfoil, prod.keys");
        BackupManager::new(self.volume).backup()?;
        self.sink.success("Backup complete");
        Ok(())
    }

    /// Clean-mode wipe: the pass always runs to completion, but a failed
    /// top-level directory deletion is fatal afterward, because the copy
    /// pass depends on those paths being gone.
    fn wipe(&mut self) -> Result<()> {
        let mut failed_trees = 0;

        for rel in WIPE_TREES {
            if !self.volume.exists(rel) {
                continue;
            }
            self.sink.info(&format!("Deleting: {rel}/"));
            if let Err(err) = fsops::remove_tree(&self.volume.resolve(rel)) {
                self.sink.warn(&format!("Failed to delete {rel}/: {err}"));
                failed_trees += 1;
            }
        }

        let registry = self.registry;
        for list in registry.wipe_lists() {
            self.run_list(list);
        }

        self.sink.info("Creating: switch/");
        let placeholder = self.volume.resolve(PLACEHOLDER_DIR);
        fsops::ensure_dir(&placeholder)
            .map_err(|err| InstallError::from_io(&placeholder, err))?;

        if failed_trees > 0 {
            self.errors += failed_trees;
            return Err(InstallError::CleanupIncomplete {
                list: "top-level directories".to_string(),
                failed: failed_trees,
            });
        }

        self.sink.success("Wipe finished");
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        self.sink.info("Restoring: DBI, tinfoil, prod.keys");
        let manager = BackupManager::new(self.volume);
        let result = manager.restore(self.sink);

        // The staging area is consumed whether the restore succeeded or not.
        if let Err(err) = manager.cleanup() {
            self.sink
                .warn(&format!("Failed to remove backup staging area: {err}"));
            self.errors += 1;
        }

        let tolerated = result?;
        self.errors += tolerated;
        self.sink.success("Restore complete");
        Ok(())
    }

    /// Transfer the staged pack to the volume root, then record it in the
    /// manifest and prune legacy version markers.
    fn install_pack(&mut self, variant: PackVariant) -> Result<()> {
        let staging = variant.staging_dir().ok_or(InstallError::NoStagingFound)?;
        let staging_root = self.volume.resolve(staging);

        for tree in PACK_TREES {
            self.copy_pack_tree(&staging_root, tree)?;
        }
        if variant == PackVariant::Oc {
            self.copy_pack_tree(&staging_root, OC_EXTRA_TREE)?;
        }

        self.sink.info("Copying root files...");
        for name in PACK_ROOT_FILES {
            let src = staging_root.join(name);
            if !src.exists() {
                continue;
            }
            if let Err(err) = std::fs::copy(&src, self.volume.resolve(name)) {
                self.sink.warn(&format!("Failed to copy {name}: {err}"));
                self.errors += 1;
            }
        }

        self.sink.info("Writing manifest.ini...");
        match manifest::write_manifest(self.volume, variant, env!("CARGO_PKG_VERSION")) {
            Ok(()) => self.sink.success("manifest.ini written"),
            Err(err) => {
                self.sink
                    .warn(&format!("Failed to write manifest.ini: {err}"));
                self.errors += 1;
            }
        }

        let outcome = delete::delete_path_list(self.volume, &self.registry.legacy_markers);
        self.errors += outcome.failed;

        self.sink.success("Copy finished");
        Ok(())
    }

    /// One staged category tree; a missing source is an allowed skip.
    fn copy_pack_tree(&mut self, staging_root: &Path, tree: &str) -> Result<()> {
        let src = staging_root.join(tree);
        let label = format!("{tree}/");
        match copy::copy_tree_with_progress(&src, self.volume.root(), &label, self.sink) {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Remove the staging tree once its contents are installed.
    fn cleanup_staging(&mut self, variant: PackVariant) -> Result<()> {
        let staging = variant.staging_dir().ok_or(InstallError::NoStagingFound)?;
        if !self.volume.exists(staging) {
            return Ok(());
        }

        self.sink.section("Removing staging directory...");
        self.sink.info(&format!("Deleting: {staging}"));
        let path = self.volume.resolve(staging);
        match fsops::remove_tree(&path) {
            Ok(()) => {
                self.sink.success("Staging directory removed");
                Ok(())
            }
            Err(err) => {
                self.sink
                    .warn(&format!("Staging directory could not be removed: {err}"));
                Err(InstallError::from_io(&path, err))
            }
        }
    }
}
