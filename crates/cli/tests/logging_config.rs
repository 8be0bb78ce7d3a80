use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_logging_to_file() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let log_file = root.join("vaultgraph.log");

    let config_path = root.join("config.toml");
    let config_content = format!(
        r#"
version = 1
[profiles.default]
vault_root = "{}"

[logging]
level = "debug"
file = "{}"
"#,
        root.display(),
        log_file.display()
    );
    fs::write(&config_path, &config_content).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vgraph"));
    cmd.arg("--config").arg(&config_path).arg("doctor").assert().success();

    assert!(log_file.exists(), "Log file should be created");
}

#[test]
fn test_sync_writes_debug_events_to_file() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let vault = root.join("vault");
    fs::create_dir(&vault).unwrap();
    fs::write(vault.join("a.md"), "# A").unwrap();
    let log_file = root.join("sync.log");

    let config_path = root.join("config.toml");
    let config_content = format!(
        r#"
version = 1
[profiles.default]
vault_root = "{}"

[logging]
level = "error"
file = "{}"
file_level = "debug"
"#,
        vault.display(),
        log_file.display()
    );
    fs::write(&config_path, &config_content).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vgraph"));
    cmd.env_remove("RUST_LOG");
    cmd.arg("--config").arg(&config_path).arg("sync").assert().success();

    let log = fs::read_to_string(&log_file).unwrap();
    assert!(log.contains("added: a.md"), "log was: {log}");
    assert!(log.contains("sync completed"), "log was: {log}");
}

#[test]
fn test_log_file_directory_is_created_and_appended() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let log_file = root.join("logs/nested/vgraph.log");

    let config_path = root.join("config.toml");
    let config_content = format!(
        r#"
version = 1
[profiles.default]
vault_root = "{}"

[logging]
level = "error"
file = "{}"
file_level = "debug"
"#,
        root.display(),
        log_file.display()
    );
    fs::write(&config_path, &config_content).unwrap();

    for _ in 0..2 {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vgraph"));
        cmd.env_remove("RUST_LOG");
        cmd.arg("--config").arg(&config_path).arg("doctor").assert().success();
    }

    let log = fs::read_to_string(&log_file).unwrap();
    assert_eq!(log.matches("config loaded for profile default").count(), 2, "log was: {log}");
}
