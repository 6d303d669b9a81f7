//! Mounted-volume handle and existence probe
//!
//! Every path the installer touches is volume-relative; `Volume` anchors
//! them at the mount point. The probe never fails its caller: an unreadable
//! path is treated as non-existent.

use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};

/// Handle to the mounted removable volume all install operations run against.
#[derive(Debug, Clone)]
pub struct Volume {
    root: PathBuf,
}

impl Volume {
    /// Open the volume at a mount point, validating it is a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(InstallError::InvalidVolumeRoot {
                path: root.display().to_string(),
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Anchor a volume-relative path at the mount point.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.resolve(rel).exists()
    }

    /// Only meaningful when `exists` is true.
    pub fn is_directory(&self, rel: &str) -> bool {
        self.resolve(rel).is_dir()
    }
}
