//! OmniNX pack installer
//!
//! Host-side rendition of the OmniNX installer payload: detects the staged
//! pack and the current installation on a mounted SD volume, then runs the
//! update or clean-install sequence against it.

use clap::Parser;
use console::Style;

mod backup;
mod cli;
mod copy;
mod delete;
mod error;
mod fsops;
mod install;
mod manifest;
mod progress;
mod registry;
mod volume;

use cli::Cli;
use install::{InstallMode, InstallReport, Installer};
use manifest::PackVariant;
use progress::ConsoleSink;
use registry::Registry;
use volume::Volume;

fn print_header() {
    let frame = Style::new().cyan();
    println!(
        "{}",
        frame.apply_to("========================================")
    );
    println!(
        "{}",
        frame.apply_to(format!(
            "  OmniNX Installer v{}",
            env!("CARGO_PKG_VERSION")
        ))
    );
    println!(
        "{}",
        frame.apply_to("========================================")
    );
    println!();
}

fn print_no_pack_found() {
    eprintln!(
        "{}",
        Style::new()
            .red()
            .apply_to("ERROR: No OmniNX pack found on the volume!")
    );
    eprintln!("Expected one of the following at the volume root:");
    for variant in PackVariant::STAGING_ORDER {
        if let Some(dir) = variant.staging_dir() {
            eprintln!("  - {dir}/");
        }
    }
}

fn print_detection(mode: InstallMode, staging: PackVariant, status: &manifest::InstallationStatus) {
    let info = Style::new().cyan();
    println!("{}", info.apply_to(format!("Installation mode: {mode}")));
    println!("{}", info.apply_to(format!("Pack variant: {staging}")));
    if status.is_installed && !status.version.is_empty() {
        println!(
            "{}",
            info.apply_to(format!(
                "Current installation: {} {}",
                status.variant, status.version
            ))
        );
    } else if status.is_installed {
        println!(
            "{}",
            info.apply_to(format!("Current installation: {}", status.variant))
        );
    } else {
        println!("{}", info.apply_to("Current installation: none"));
    }
    println!();
}

fn confirm_start() -> bool {
    inquire::Confirm::new("Ready to install/update. Start now?")
        .with_default(true)
        .prompt()
        .unwrap_or(false)
}

fn print_summary(result: &Result<InstallReport, error::InstallError>) {
    println!();
    match result {
        Ok(report) if report.errors == 0 => {
            let ok = Style::new().green();
            println!("{}", ok.apply_to("========================================"));
            println!("{}", ok.apply_to("    Installation complete!"));
            println!("{}", ok.apply_to("========================================"));
        }
        Ok(report) => {
            let warn = Style::new().yellow();
            println!(
                "{}",
                warn.apply_to("========================================")
            );
            println!("{}", warn.apply_to("    Installation finished"));
            println!("{}", warn.apply_to(format!("    {} errors", report.errors)));
            println!(
                "{}",
                warn.apply_to("========================================")
            );
        }
        Err(_) => {
            let red = Style::new().red();
            println!("{}", red.apply_to("========================================"));
            println!("{}", red.apply_to("    Installation failed"));
            println!("{}", red.apply_to("========================================"));
        }
    }
}

fn main() {
    let cli = Cli::parse();
    print_header();

    let volume = match Volume::open(cli.root.clone()) {
        Ok(volume) => volume,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let status = manifest::detect_installed(&volume);
    let staging = manifest::detect_staging_variant(&volume);

    if staging == PackVariant::None {
        print_no_pack_found();
        std::process::exit(1);
    }

    let mode = InstallMode::from_status(&status);
    print_detection(mode, staging, &status);

    if !cli.yes && !confirm_start() {
        println!("Aborted.");
        std::process::exit(1);
    }

    let registry = match Registry::load() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut sink = ConsoleSink::new();
    let result = Installer::new(&volume, &registry, &mut sink).run(staging, mode);

    print_summary(&result);

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
