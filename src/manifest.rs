//! Pack variant and installation-state detection
//!
//! The manifest is a small bracketed-section `key=value` file at a fixed
//! path under the volume's config directory. Absence of a confidently
//! parsed variant is equivalent to "not installed", even when the file
//! itself exists.

use std::collections::HashMap;
use std::fmt;
use std::fs;

use crate::error::{InstallError, Result};
use crate::volume::Volume;

pub const MANIFEST_PATH: &str = "config/omninx/manifest.ini";
const MANIFEST_DIR: &str = "config/omninx";
const MANIFEST_SECTION: &str = "OmniNX";
const VERSION_MAX_CHARS: usize = 31;

/// One of the predefined content bundles, or `None` when no pack could be
/// identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackVariant {
    None,
    Standard,
    Light,
    Oc,
}

impl PackVariant {
    /// Staging directories are probed in this fixed order; the first match
    /// wins even when several staging trees exist side by side.
    pub const STAGING_ORDER: [PackVariant; 3] =
        [PackVariant::Standard, PackVariant::Light, PackVariant::Oc];

    pub fn from_pack_name(name: &str) -> Self {
        match name {
            "standard" => PackVariant::Standard,
            "light" => PackVariant::Light,
            "oc" => PackVariant::Oc,
            _ => PackVariant::None,
        }
    }

    /// Key written to and read from the manifest.
    pub fn pack_name(self) -> Option<&'static str> {
        match self {
            PackVariant::Standard => Some("standard"),
            PackVariant::Light => Some("light"),
            PackVariant::Oc => Some("oc"),
            PackVariant::None => None,
        }
    }

    /// Top-level staging tree holding this variant's files before install.
    pub fn staging_dir(self) -> Option<&'static str> {
        match self {
            PackVariant::Standard => Some("OmniNX Standard"),
            PackVariant::Light => Some("OmniNX Light"),
            PackVariant::Oc => Some("OmniNX OC"),
            PackVariant::None => None,
        }
    }

    /// Numeric update channel recorded alongside the pack name.
    pub fn update_channel(self) -> u8 {
        match self {
            PackVariant::Standard => 2,
            PackVariant::Light => 0,
            PackVariant::Oc => 1,
            PackVariant::None => 0,
        }
    }
}

impl fmt::Display for PackVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackVariant::Standard => "Standard",
            PackVariant::Light => "Light",
            PackVariant::Oc => "OC",
            PackVariant::None => "None",
        };
        write!(f, "{name}")
    }
}

/// Derived once per run from the manifest; read-only afterward.
#[derive(Debug, Clone)]
pub struct InstallationStatus {
    pub variant: PackVariant,
    pub is_installed: bool,
    pub version: String,
}

/// Read the manifest and decide whether a pack is already installed.
///
/// A manifest that exists but carries no recognizable `current_pack` value
/// still counts as "not installed".
pub fn detect_installed(volume: &Volume) -> InstallationStatus {
    let mut status = InstallationStatus {
        variant: PackVariant::None,
        is_installed: false,
        version: String::new(),
    };

    let Ok(text) = fs::read_to_string(volume.resolve(MANIFEST_PATH)) else {
        return status;
    };

    let pairs = parse_section(&text, MANIFEST_SECTION);
    if let Some(pack) = pairs.get("current_pack") {
        status.variant = PackVariant::from_pack_name(pack);
    }
    if status.variant != PackVariant::None {
        status.is_installed = true;
        if let Some(version) = pairs.get("version") {
            status.version = truncate_chars(version, VERSION_MAX_CHARS);
        }
    }

    status
}

/// Probe the fixed staging directories and return the first variant whose
/// tree is present.
pub fn detect_staging_variant(volume: &Volume) -> PackVariant {
    for variant in PackVariant::STAGING_ORDER {
        if let Some(dir) = variant.staging_dir() {
            if volume.exists(dir) {
                return variant;
            }
        }
    }
    PackVariant::None
}

/// Record the freshly installed pack: single section, four keys.
pub fn write_manifest(volume: &Volume, variant: PackVariant, version: &str) -> Result<()> {
    let pack = variant.pack_name().unwrap_or("unknown");
    let channel = variant.update_channel();

    let dir = volume.resolve(MANIFEST_DIR);
    fs::create_dir_all(&dir).map_err(|err| InstallError::from_io(&dir, err))?;

    let path = volume.resolve(MANIFEST_PATH);
    let body = format!(
        "[{MANIFEST_SECTION}]\ncurrent_pack={pack}\nversion={version}\nupdate_channel={channel}\nchannel_pack={pack}\n"
    );
    fs::write(&path, body).map_err(|err| InstallError::from_io(&path, err))
}

/// Minimal line parser for the bracketed-section `key=value` format. Only
/// the wanted section's pairs are collected; the first occurrence of a key
/// wins.
fn parse_section(text: &str, wanted: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    let mut in_section = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if in_section {
                break;
            }
            in_section = name == wanted;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            pairs
                .entry(key.trim().to_string())
                .or_insert_with(|| value.trim().to_string());
        }
    }

    pairs
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
