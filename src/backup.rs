//! Backup and restore of user-owned content across a clean install
//!
//! The staging area under the volume root is itself the record of what was
//! backed up: restore re-derives its work purely from what exists there, so
//! a partial backup restores partially without any extra bookkeeping.

use std::fs;

use crate::error::{InstallError, Result};
use crate::fsops;
use crate::progress::ProgressSink;
use crate::volume::Volume;

pub const TEMP_BACKUP_DIR: &str = "temp_backup";

const SWITCH_DIR: &str = "switch";
const PRESERVED_DIRS: [&str; 2] = ["switch/DBI", "switch/tinfoil"];
const PRESERVED_FILE: &str = "switch/prod.keys";
const PRESERVED_FILE_NAME: &str = "prod.keys";

/// Binaries from superseded releases that would shadow the restored tool.
/// Pruned only after the owning directory restores cleanly.
const DBI_STALE_FILES: [&str; 5] = [
    "switch/DBI/DBI_810_EN.nro",
    "switch/DBI/DBI_810_DE.nro",
    "switch/DBI/DBI_845_EN.nro",
    "switch/DBI/DBI_845_DE.nro",
    "switch/DBI/DBI.nro",
];
const TINFOIL_STALE_FILES: [&str; 1] = ["switch/tinfoil/tinfoil.nro"];

pub struct BackupManager<'a> {
    volume: &'a Volume,
}

impl<'a> BackupManager<'a> {
    pub fn new(volume: &'a Volume) -> Self {
        Self { volume }
    }

    /// Copy the preserved set into the staging area. Fail-fast: a partial
    /// backup may remain on disk, but the failure propagates so the
    /// orchestrator never reaches the wipe.
    pub fn backup(&self) -> Result<()> {
        let staging = self.volume.resolve(TEMP_BACKUP_DIR);
        fsops::ensure_dir(&staging).map_err(|err| InstallError::from_io(&staging, err))?;

        for rel in PRESERVED_DIRS {
            if self.volume.exists(rel) {
                let src = self.volume.resolve(rel);
                fsops::copy_tree(&src, &staging)
                    .map_err(|err| InstallError::from_io(&src, err))?;
            }
        }

        if self.volume.exists(PRESERVED_FILE) {
            let src = self.volume.resolve(PRESERVED_FILE);
            fs::copy(&src, staging.join(PRESERVED_FILE_NAME))
                .map_err(|err| InstallError::from_io(&src, err))?;
        }

        Ok(())
    }

    /// Replay the staging area back under `switch/`, returning the number of
    /// tolerated failures.
    ///
    /// Each preserved item is checked independently, so a partial backup
    /// restores whatever is there. Directory restores continue on error
    /// (failure reported, not returned); the key-file restore aborts on
    /// error.
    pub fn restore(&self, sink: &mut dyn ProgressSink) -> Result<usize> {
        let mut tolerated = 0;
        let staging = self.volume.resolve(TEMP_BACKUP_DIR);
        let switch = self.volume.resolve(SWITCH_DIR);
        fsops::ensure_dir(&switch).map_err(|err| InstallError::from_io(&switch, err))?;

        for (name, stale_files) in [
            ("DBI", &DBI_STALE_FILES[..]),
            ("tinfoil", &TINFOIL_STALE_FILES[..]),
        ] {
            let backed_up = staging.join(name);
            if !backed_up.exists() {
                continue;
            }
            match fsops::copy_tree(&backed_up, &switch) {
                Ok(()) => {
                    for rel in stale_files {
                        let _ = fsops::remove_file(&self.volume.resolve(rel));
                    }
                }
                Err(err) => {
                    sink.warn(&format!("Failed to restore {name}: {err}"));
                    tolerated += 1;
                }
            }
        }

        let keys_backup = staging.join(PRESERVED_FILE_NAME);
        if keys_backup.exists() {
            fs::copy(&keys_backup, self.volume.resolve(PRESERVED_FILE))
                .map_err(|err| InstallError::from_io(&keys_backup, err))?;
        }

        Ok(tolerated)
    }

    /// Delete the staging area if present; idempotent.
    pub fn cleanup(&self) -> Result<()> {
        fsops::remove_tree(&self.volume.resolve(TEMP_BACKUP_DIR)).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingSink;
    use tempfile::TempDir;

    fn seed_user_data(volume: &Volume) {
        fs::create_dir_all(volume.resolve("switch/DBI/config")).unwrap();
        fs::write(volume.resolve("switch/DBI/dbi.config"), "sort=name").unwrap();
        fs::write(volume.resolve("switch/DBI/config/state.bin"), "state").unwrap();
        fs::create_dir_all(volume.resolve("switch/tinfoil")).unwrap();
        fs::write(volume.resolve("switch/tinfoil/options.json"), "{}").unwrap();
        fs::write(volume.resolve("switch/prod.keys"), "master_key_00 = ab").unwrap();
    }

    #[test]
    fn test_backup_copies_all_three_items() {
        let temp = TempDir::new().unwrap();
        let volume = Volume::open(temp.path()).unwrap();
        seed_user_data(&volume);

        BackupManager::new(&volume).backup().unwrap();

        assert!(volume.exists("temp_backup/DBI/dbi.config"));
        assert!(volume.exists("temp_backup/DBI/config/state.bin"));
        assert!(volume.exists("temp_backup/tinfoil/options.json"));
        assert_eq!(
            fs::read_to_string(volume.resolve("temp_backup/prod.keys")).unwrap(),
            "master_key_00 = ab"
        );
    }

    #[test]
    fn test_backup_tolerates_missing_items() {
        let temp = TempDir::new().unwrap();
        let volume = Volume::open(temp.path()).unwrap();
        fs::create_dir_all(volume.resolve("switch")).unwrap();
        fs::write(volume.resolve("switch/prod.keys"), "keys").unwrap();

        BackupManager::new(&volume).backup().unwrap();

        assert!(volume.exists("temp_backup/prod.keys"));
        assert!(!volume.exists("temp_backup/DBI"));
        assert!(!volume.exists("temp_backup/tinfoil"));
    }

    #[test]
    fn test_round_trip_restores_byte_identical_content() {
        let temp = TempDir::new().unwrap();
        let volume = Volume::open(temp.path()).unwrap();
        seed_user_data(&volume);

        let manager = BackupManager::new(&volume);
        manager.backup().unwrap();

        // Simulate the wipe between backup and restore.
        fs::remove_dir_all(volume.resolve("switch")).unwrap();

        let mut sink = RecordingSink::new();
        let tolerated = manager.restore(&mut sink).unwrap();
        assert_eq!(tolerated, 0);

        assert_eq!(
            fs::read_to_string(volume.resolve("switch/DBI/dbi.config")).unwrap(),
            "sort=name"
        );
        assert_eq!(
            fs::read_to_string(volume.resolve("switch/DBI/config/state.bin")).unwrap(),
            "state"
        );
        assert_eq!(
            fs::read_to_string(volume.resolve("switch/tinfoil/options.json")).unwrap(),
            "{}"
        );
        assert_eq!(
            fs::read_to_string(volume.resolve("switch/prod.keys")).unwrap(),
            "master_key_00 = ab"
        );
    }

    #[test]
    fn test_restore_prunes_stale_binaries() {
        let temp = TempDir::new().unwrap();
        let volume = Volume::open(temp.path()).unwrap();
        seed_user_data(&volume);
        fs::write(volume.resolve("switch/DBI/DBI.nro"), "old binary").unwrap();
        fs::write(volume.resolve("switch/tinfoil/tinfoil.nro"), "old binary").unwrap();

        let manager = BackupManager::new(&volume);
        manager.backup().unwrap();
        fs::remove_dir_all(volume.resolve("switch")).unwrap();

        let mut sink = RecordingSink::new();
        manager.restore(&mut sink).unwrap();

        assert!(!volume.exists("switch/DBI/DBI.nro"));
        assert!(!volume.exists("switch/tinfoil/tinfoil.nro"));
        assert!(volume.exists("switch/DBI/dbi.config"));
    }

    #[test]
    fn test_restore_handles_partial_backup() {
        let temp = TempDir::new().unwrap();
        let volume = Volume::open(temp.path()).unwrap();
        fs::create_dir_all(volume.resolve("temp_backup")).unwrap();
        fs::write(volume.resolve("temp_backup/prod.keys"), "keys only").unwrap();

        let mut sink = RecordingSink::new();
        BackupManager::new(&volume).restore(&mut sink).unwrap();

        assert_eq!(
            fs::read_to_string(volume.resolve("switch/prod.keys")).unwrap(),
            "keys only"
        );
        assert!(!volume.exists("switch/DBI"));
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let volume = Volume::open(temp.path()).unwrap();
        fs::create_dir_all(volume.resolve("temp_backup/DBI")).unwrap();

        let manager = BackupManager::new(&volume);
        manager.cleanup().unwrap();
        assert!(!volume.exists("temp_backup"));
        manager.cleanup().unwrap();
    }
}
