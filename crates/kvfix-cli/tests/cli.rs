use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::str::contains;

fn cmd() -> Command {
    cargo_bin_cmd!("kvfix")
}

#[test]
fn help_lists_options() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--dry-run"))
        .stdout(contains("--kv-cli"))
        .stdout(contains("--timeout-ms"));
}

#[test]
fn missing_namespace_exits_with_usage_status() {
    cmd()
        .env_remove("RUST_LOG")
        .assert()
        .code(2)
        .stderr(contains("missing namespace identifier"));
}

#[test]
fn unreadable_config_file_exits_with_failure() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    cmd()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .assert()
        .code(1)
        .stderr(contains("absent.toml"));
}

#[test]
fn unknown_config_keys_exit_with_failure() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("kvfix.toml");
    std::fs::write(&path, "namespace = \"ns-1\"\n").expect("write config");

    cmd().arg("--config").arg(&path).assert().code(1);
}

#[test]
fn unknown_flag_is_a_usage_error() {
    cmd().args(["ns-1", "--no-such-flag"]).assert().code(2);
}
