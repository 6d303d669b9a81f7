//! Clean-mode end-to-end tests

mod common;

use predicates::prelude::*;

#[test]
fn test_clean_runs_all_four_steps() {
    let volume = common::TestVolume::new();
    volume.stage_pack("OmniNX Standard");

    volume
        .installer_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("Installation mode: Clean install"))
        .stdout(predicate::str::contains("Step 1: Backing up user data..."))
        .stdout(predicate::str::contains("Step 2: Wiping old installation..."))
        .stdout(predicate::str::contains("Step 3: Restoring user data..."))
        .stdout(predicate::str::contains("Step 4: Copying files..."))
        .stdout(predicate::str::contains("Installation complete!"));
}

#[test]
fn test_clean_round_trips_user_data_across_the_wipe() {
    let volume = common::TestVolume::new();
    volume.stage_pack("OmniNX Standard");
    volume.write_file("switch/DBI/dbi.config", "sort=size");
    volume.write_file("switch/DBI/cache/list.bin", "cached");
    volume.write_file("switch/tinfoil/options.json", "{\"net\":true}");
    volume.write_file("switch/prod.keys", "master_key_00 = feedface");

    volume.installer_cmd().assert().success();

    assert_eq!(volume.read_file("switch/DBI/dbi.config"), "sort=size");
    assert_eq!(volume.read_file("switch/DBI/cache/list.bin"), "cached");
    assert_eq!(
        volume.read_file("switch/tinfoil/options.json"),
        "{\"net\":true}"
    );
    assert_eq!(
        volume.read_file("switch/prod.keys"),
        "master_key_00 = feedface"
    );
    // The backup staging area never outlives the run.
    assert!(!volume.file_exists("temp_backup"));
}

#[test]
fn test_clean_wipes_foreign_cfw_content() {
    let volume = common::TestVolume::new();
    volume.stage_pack("OmniNX Standard");

    // A foreign CFW setup with no OmniNX manifest.
    volume.write_file("atmosphere/contents/title/exefs.nsp", "foreign");
    volume.write_file("bootloader/ini/foreign.ini", "foreign");
    volume.write_file("config/other-tool/conf.ini", "foreign");
    volume.write_file("switch/some-tool/some-tool.nro", "foreign");
    volume.write_file("boot.ini", "foreign");
    volume.write_file("fusee-primary.bin", "foreign");

    volume.installer_cmd().assert().success();

    assert!(!volume.file_exists("atmosphere/contents/title"));
    assert!(!volume.file_exists("bootloader/ini/foreign.ini"));
    assert!(!volume.file_exists("config/other-tool"));
    assert!(!volume.file_exists("switch/some-tool"));
    assert!(!volume.file_exists("fusee-primary.bin"));
    // Replaced by the staged pack.
    assert_eq!(volume.read_file("boot.dat"), "new boot.dat");
}

#[test]
fn test_clean_prunes_stale_tool_binaries_after_restore() {
    let volume = common::TestVolume::new();
    volume.stage_pack("OmniNX Light");
    volume.write_file("switch/DBI/dbi.config", "kept");
    volume.write_file("switch/DBI/DBI.nro", "superseded");
    volume.write_file("switch/tinfoil/options.json", "kept");
    volume.write_file("switch/tinfoil/tinfoil.nro", "superseded");

    volume.installer_cmd().assert().success();

    assert_eq!(volume.read_file("switch/DBI/dbi.config"), "kept");
    assert_eq!(volume.read_file("switch/tinfoil/options.json"), "kept");
    assert!(!volume.file_exists("switch/DBI/DBI.nro"));
    assert!(!volume.file_exists("switch/tinfoil/tinfoil.nro"));
}

#[test]
fn test_clean_on_empty_volume_installs_the_pack() {
    let volume = common::TestVolume::new();
    volume.stage_pack("OmniNX Standard");

    volume.installer_cmd().assert().success();

    assert!(volume.file_exists("switch"));
    assert_eq!(volume.read_file("atmosphere/package3"), "package3");
    let manifest = volume.read_file("config/omninx/manifest.ini");
    assert!(manifest.contains("current_pack=standard"));
    assert!(manifest.contains("update_channel=2"));
    assert!(!volume.file_exists("OmniNX Standard"));
}

#[test]
fn test_second_run_after_clean_install_is_an_update() {
    let volume = common::TestVolume::new();
    volume.stage_pack("OmniNX Standard");
    volume.installer_cmd().assert().success();

    // Stage again; the manifest written by the first run flips the mode.
    volume.stage_pack("OmniNX Standard");
    volume
        .installer_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("Installation mode: Update"));
}
