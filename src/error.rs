//! Error types and handling for the installer
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//! "Not found" stays a first-class variant because large parts of the install
//! flow downgrade it to success (deletion targets, optional staging trees).

use std::io;
use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for installer operations
#[derive(Error, Diagnostic, Debug)]
pub enum InstallError {
    #[error("Path not found: {path}")]
    #[diagnostic(code(omninx::fs::not_found))]
    NotFound { path: String },

    #[error("Destination exists but is not a directory: {path}")]
    #[diagnostic(
        code(omninx::fs::destination_conflict),
        help("Remove the conflicting file from the volume and rerun the installer")
    )]
    DestinationConflict { path: String },

    #[error("Failed to copy {src} -> {dst}: {reason}")]
    #[diagnostic(code(omninx::fs::copy_failed))]
    CopyFailed {
        src: String,
        dst: String,
        reason: String,
    },

    #[error("{failed} entries in list '{list}' could not be deleted")]
    #[diagnostic(code(omninx::cleanup::incomplete))]
    CleanupIncomplete { list: String, failed: usize },

    #[error("No OmniNX pack found on the volume")]
    #[diagnostic(
        code(omninx::staging::missing),
        help("Expected 'OmniNX Standard', 'OmniNX Light' or 'OmniNX OC' at the volume root")
    )]
    NoStagingFound,

    #[error("Volume root is not a directory: {path}")]
    #[diagnostic(
        code(omninx::volume::invalid),
        help("Pass the mount point of the SD volume")
    )]
    InvalidVolumeRoot { path: String },

    #[error("Deletion-list registry is invalid: {reason}")]
    #[diagnostic(code(omninx::registry::invalid))]
    RegistryInvalid { reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(omninx::fs::io_error))]
    Io { message: String },
}

impl InstallError {
    /// Build from an `io::Error`, keeping "not found" distinguishable.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            InstallError::NotFound {
                path: path.display().to_string(),
            }
        } else {
            InstallError::Io {
                message: format!("{}: {}", path.display(), err),
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, InstallError::NotFound { .. })
    }
}

impl From<io::Error> for InstallError {
    fn from(err: io::Error) -> Self {
        InstallError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, InstallError>;
