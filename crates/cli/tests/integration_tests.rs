//! Integration tests for the store shell.
//! Each test drives the built binary through stdin against a file medium in a
//! temporary directory.
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::tempdir;

const ALARM_OFFSET: usize = 233;
const EXTENSION_OFFSET: usize = 273;

fn spawn_cli(nvm_path: &Path, extra_env: &[(&str, &str)], commands: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cli"));
    cmd.env("NVM_PATH", nvm_path)
        .env("NVM_SYNC", "false")
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (k, v) in extra_env {
        cmd.env(k, v);
    }
    let mut child = cmd.spawn().expect("failed to spawn cli");

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        stdin.write_all(commands.as_bytes()).expect("failed to write commands");
        stdin.write_all(b"EXIT\n").expect("failed to write EXIT");
    }

    child.wait_with_output().expect("failed to read output")
}

/// Runs `commands` and returns stdout.
fn run_cli(nvm_path: &Path, commands: &str) -> String {
    let output = spawn_cli(nvm_path, &[], commands);
    assert!(
        output.status.success(),
        "cli failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

// --------------------- Boot ---------------------

#[test]
fn test_first_boot_restores_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = run_cli(&path, "");

    assert!(output.contains("restored: meta, network, messaging, io, alarm"));
    assert!(output.contains("corrupt (kept): extension"));
    assert!(output.contains("errorCounter=1"));
    assert!(output.contains("bye"));
    assert_eq!(fs::metadata(&path).unwrap().len(), 512);
}

#[test]
fn test_second_boot_restores_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    run_cli(&path, "");
    let output = run_cli(&path, "");

    assert!(!output.contains("restored:"));
    assert!(output.contains("corrupt (kept): extension"));
    assert!(output.contains("errorCounter=1"));
}

#[test]
fn test_corrupt_segment_is_restored_on_boot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");
    run_cli(&path, "SET network.ota_password keep-me\nCOMMIT\n");

    let mut bytes = fs::read(&path).unwrap();
    bytes[ALARM_OFFSET] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let output = run_cli(&path, "SHOW alarm\nSHOW network\n");
    assert!(output.contains("restored: alarm"));
    assert!(output.contains("errorCounter=2"));
    assert!(output.contains("alarm.home_address = Home Address"));
    assert!(output.contains("network.ota_password = keep-me"));
}

#[test]
fn test_corrupt_extension_is_left_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");
    run_cli(&path, "ACCEPT extension\nCOMMIT\n");

    let mut bytes = fs::read(&path).unwrap();
    bytes[EXTENSION_OFFSET] = b'Q';
    fs::write(&path, &bytes).unwrap();

    let output = run_cli(&path, "");
    assert!(output.contains("corrupt (kept): extension"));
    assert!(!output.contains("restored:"));
    assert_eq!(fs::read(&path).unwrap(), bytes, "medium must not be rewritten");
}

#[test]
fn test_medium_too_small_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = spawn_cli(&path, &[("NVM_CAPACITY", "200")], "");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot open configuration store"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = spawn_cli(&path, &[("NVM_IO_RETRIES", "lots")], "");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("NVM_IO_RETRIES"));
}

#[test]
fn test_base_address_offsets_image() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = spawn_cli(&path, &[("NVM_BASE_ADDRESS", "100")], "");
    assert!(output.status.success());

    let bytes = fs::read(&path).unwrap();
    assert!(bytes[..100].iter().all(|&b| b == 0xFF));
    // meta.version = 1, little-endian, right after the error counter
    assert_eq!(&bytes[100..104], &[1, 0, 1, 0]);
}

// --------------------- Edit & commit ---------------------

#[test]
fn test_set_commit_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = run_cli(
        &path,
        "SET alarm.home_address 4 Privet Drive\nSET io.led_brightness_run 100\nCOMMIT\n",
    );
    assert_eq!(output.matches("OK").count(), 3);

    let output = run_cli(&path, "SHOW alarm\nSHOW io\n");
    assert!(output.contains("alarm.home_address = 4 Privet Drive"));
    assert!(output.contains("io.led_brightness_run = 100"));
    assert!(output.contains("io.led_brightness_config = 1023"));
}

#[test]
fn test_uncommitted_changes_are_lost_on_reboot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = run_cli(
        &path,
        "SET messaging.user alice\nSHOW messaging\nREBOOT\nSHOW messaging\n",
    );
    assert!(output.contains("messaging.user = alice"));
    assert!(output.contains("messaging.user = testuser"));
}

#[test]
fn test_set_rejects_bad_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let long = "x".repeat(40);
    let commands = format!(
        "SET meta.error_counter 0\nSET meta.version 10000\nSET io.led_brightness_run 5000\n\
         SET network.ap_password {}\nSET alarm.colour red\nSET garage.door open\nSET alarm\n",
        long
    );
    let output = run_cli(&path, &commands);

    assert_eq!(output.matches("ERR").count(), 7);
    assert!(output.contains("cannot be set"));
    assert!(output.contains("out of range"));
    assert!(output.contains("unknown segment"));
    assert!(output.contains("ERR usage: SET segment.field value"));
}

#[test]
fn test_set_version_within_range() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = run_cli(&path, "SET meta.version 9999\nCOMMIT\nSTATUS\n");
    assert!(output.contains("version=9999 bytesConsumed=283 structures=6 errorCounter=1"));
}

// --------------------- Inspection ---------------------

#[test]
fn test_status_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = run_cli(&path, "STATUS\n");
    assert!(output.contains("version=1 bytesConsumed=283 structures=6 errorCounter=1"));
}

#[test]
fn test_check_and_accept() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = run_cli(&path, "CHECK\nACCEPT extension\nCHECK\n");
    assert!(output.contains("extension  CORRUPT expected 0x"));
    assert!(output.contains("(1 of 6 segments corrupt)"));
    assert!(output.contains("(0 of 6 segments corrupt)"));
}

#[test]
fn test_show_by_index_and_unknown() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = run_cli(&path, "SHOW 1\nSHOW attic\nSHOW\n");
    assert!(output.contains("[network] offset=12 size=72 ok"));
    assert!(output.contains("network.ap_password = password"));
    assert!(output.contains("ERR unknown segment"));
    assert!(output.contains("ERR usage: SHOW segment"));
}

#[test]
fn test_unknown_command() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = run_cli(&path, "FROB\n");
    assert!(output.contains("unknown command: FROB"));
}

#[test]
fn test_commands_are_case_insensitive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    let output = run_cli(&path, "status\nshow META\n");
    assert!(output.contains("errorCounter=1"));
    assert!(output.contains("meta.version = 1"));
}

// --------------------- Factory reset ---------------------

#[test]
fn test_clear_then_reboot_is_factory_reset() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");

    run_cli(&path, "SET messaging.server_address 10.1.2.3\nCOMMIT\n");

    let output = run_cli(
        &path,
        "CLEAR\nSHOW messaging\nREBOOT\nSHOW messaging\n",
    );
    assert!(output.contains("OK (defaults apply after REBOOT)"));
    // the mirror keeps its contents until the reboot
    assert!(output.contains("messaging.server_address = 10.1.2.3"));
    assert!(output.contains("messaging.server_address = localhost"));
    assert_eq!(output.matches("restored: meta, network, messaging, io, alarm").count(), 1);

    let bytes = fs::read(&path).unwrap();
    assert!(bytes[283..].iter().all(|&b| b == 0xFF));
}

#[test]
fn test_exit_does_not_commit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nvm.bin");
    run_cli(&path, "");
    let before = fs::read(&path).unwrap();

    run_cli(&path, "SET alarm.home_address Nowhere\nQUIT\n");
    assert_eq!(fs::read(&path).unwrap(), before);
}
