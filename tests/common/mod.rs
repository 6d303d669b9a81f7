//! Common test utilities for installer integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A mounted-volume fixture for integration tests
#[allow(dead_code)]
pub struct TestVolume {
    /// Temporary directory standing in for the mounted SD volume
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the volume root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestVolume {
    /// Create a new empty volume
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file on the volume, creating parent directories
    pub fn write_file(&self, rel: &str, content: &str) {
        let file_path = self.path.join(rel);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the volume
    pub fn read_file(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path.join(rel)).expect("Failed to read file")
    }

    /// Check if a path exists on the volume
    pub fn file_exists(&self, rel: &str) -> bool {
        self.path.join(rel).exists()
    }

    /// Create a directory on the volume
    pub fn create_dir(&self, rel: &str) -> PathBuf {
        let dir = self.path.join(rel);
        std::fs::create_dir_all(&dir).expect("Failed to create directory");
        dir
    }

    /// Stage a small but representative pack under the given staging
    /// directory name
    pub fn stage_pack(&self, staging: &str) {
        self.write_file(&format!("{staging}/atmosphere/package3"), "package3");
        self.write_file(
            &format!("{staging}/atmosphere/config/system_settings.ini"),
            "[ams] enabled=1",
        );
        self.write_file(
            &format!("{staging}/bootloader/hekate_ipl.ini"),
            "[config] autoboot=0",
        );
        self.write_file(&format!("{staging}/config/omninx/default.ini"), "[defaults]");
        self.write_file(
            &format!("{staging}/switch/sphaira/sphaira.nro"),
            "new sphaira",
        );
        self.write_file(&format!("{staging}/boot.dat"), "new boot.dat");
        self.write_file(&format!("{staging}/payload.bin"), "new payload");
    }

    /// Write an installed-pack manifest on the volume
    pub fn write_manifest(&self, pack: &str, version: &str) {
        self.write_file(
            "config/omninx/manifest.ini",
            &format!("[OmniNX]\ncurrent_pack={pack}\nversion={version}\n"),
        );
    }

    /// Installer command pointed at this volume, confirmation skipped
    pub fn installer_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("omninx-installer").expect("Failed to find binary");
        cmd.arg(&self.path).arg("--yes");
        cmd
    }
}
