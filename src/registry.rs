//! Path-list registry
//!
//! Named, ordered sets of volume-relative paths marking obsolete or
//! superseded content. The data lives in a versioned YAML file embedded at
//! compile time; this module only deserializes and serves it. Pure data,
//! never mutated at runtime.

use serde::Deserialize;

use crate::error::{InstallError, Result};

const REGISTRY_DATA: &str = include_str!("deletion_lists.yaml");

/// One named list. Entries are directory or file paths; the type is not
/// tagged here and gets probed at deletion time.
#[derive(Debug, Clone, Deserialize)]
pub struct PathList {
    pub name: String,
    /// Banner printed before this list runs, when present.
    #[serde(default)]
    pub section: Option<String>,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registry {
    /// Lists run by update-mode cleanup, strictly in declared order.
    pub update_cleanup: Vec<PathList>,
    /// Names of `update_cleanup` lists shared by the clean-mode wipe.
    wipe: Vec<String>,
    /// Version-marker files from superseded releases, pruned after install.
    pub legacy_markers: PathList,
}

impl Registry {
    /// Deserialize the embedded registry. The data file ships inside the
    /// binary, so a parse failure is a packaging defect rather than a user
    /// error.
    pub fn load() -> Result<Self> {
        serde_yaml::from_str(REGISTRY_DATA).map_err(|err| InstallError::RegistryInvalid {
            reason: err.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&PathList> {
        self.update_cleanup.iter().find(|list| list.name == name)
    }

    /// Lists the clean-mode wipe shares with update cleanup, in run order.
    pub fn wipe_lists(&self) -> Vec<&PathList> {
        self.wipe.iter().filter_map(|name| self.get(name)).collect()
    }
}
