//! CLI definitions using clap derive API

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::PathBuf;

/// OmniNX pack installer
///
/// Installs, updates or cleanly reinstalls an OmniNX CFW pack on a mounted
/// SD volume, preserving user data across destructive operations.
#[derive(Parser, Debug)]
#[command(
    name = "omninx-installer",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "OmniNX pack installer for SD volumes",
    long_about = "Detects the staged OmniNX pack on a mounted SD volume and installs it. \
                  A detected prior installation is updated in place; otherwise the known \
                  CFW directories are wiped, with user data preserved across the wipe.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  omninx-installer /mnt/sdcard\n    \
                  omninx-installer /mnt/sdcard --yes"
)]
pub struct Cli {
    /// Mount point of the SD volume
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}
