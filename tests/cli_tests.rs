use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("cli_test_{}_{}", std::process::id(), nanos));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const SRC: &str = "package svc\n\n//go:generate validation-gen\ntype Service struct {\n\tClient  *Client\n\tTimeout int\n}\n";

fn command(dir: &PathBuf) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_validation-gen"));
    cmd.current_dir(dir)
        .env_remove("GOFILE")
        .env_remove("VALIDATION_GEN_LOG")
        .env_remove("VALIDATION_GEN_GOFMT_BIN");
    cmd
}

#[test]
fn test_cli_uses_gofile() {
    let dir = temp_dir();
    fs::write(dir.join("service.go"), SRC).unwrap();

    let output = command(&dir)
        .env("GOFILE", "service.go")
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        "Successfully generated service_gen.go from service.go"
    );
    assert!(dir.join("service_gen.go").exists());

    let output = command(&dir)
        .env("GOFILE", "service.go")
        .output()
        .expect("run cli");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Skipped existing service_gen.go (use --force to overwrite)"
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_cli_falls_back_to_example_go() {
    let dir = temp_dir();
    fs::write(dir.join("example.go"), SRC).unwrap();

    let status = command(&dir).status().expect("run cli");
    assert!(status.success());
    assert!(dir.join("example_gen.go").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_cli_empty_gofile_falls_back_to_example_go() {
    let dir = temp_dir();
    fs::write(dir.join("example.go"), SRC).unwrap();

    let output = command(&dir)
        .env("GOFILE", "")
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dir.join("example_gen.go").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_cli_usage_errors_exit_with_one() {
    let dir = temp_dir();

    let output = command(&dir)
        .arg("--no-such-flag")
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--no-such-flag"));

    let output = command(&dir).arg("--help").output().expect("run cli");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--input"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_cli_failure_exit_code_and_message() {
    let dir = temp_dir();
    fs::write(dir.join("plain.go"), "package plain\n\ntype S struct{}\n").unwrap();

    let output = command(&dir)
        .args(["--input", "plain.go"])
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: no structs with //go:generate directive found in plain.go"));
    assert!(!dir.join("plain_gen.go").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_cli_dry_run_prints_code() {
    let dir = temp_dir();
    fs::write(dir.join("service.go"), SRC).unwrap();

    let output = command(&dir)
        .args(["--input", "service.go", "--dry-run"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("// Code generated by validation-gen; DO NOT EDIT.\n"));
    assert!(stdout.contains("func NewService(params ServiceParams) (*Service, error) {"));
    assert!(!dir.join("service_gen.go").exists());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_cli_explicit_output_and_force() {
    let dir = temp_dir();
    fs::write(dir.join("service.go"), SRC).unwrap();
    fs::create_dir_all(dir.join("gen")).unwrap();
    fs::write(dir.join("gen/params.go"), "// stale\n").unwrap();

    let status = command(&dir)
        .args(["--input", "service.go", "--output", "gen/params.go", "--force"])
        .status()
        .expect("run cli");
    assert!(status.success());
    let written = fs::read_to_string(dir.join("gen/params.go")).unwrap();
    assert!(written.contains("type ServiceParams struct {"));

    fs::remove_dir_all(&dir).unwrap();
}

#[cfg(unix)]
#[test]
fn test_cli_gofmt_stub() {
    use std::os::unix::fs::PermissionsExt;

    let dir = temp_dir();
    fs::write(dir.join("service.go"), SRC).unwrap();
    let stub = dir.join("gofmt");
    fs::write(&stub, "#!/bin/sh\ncat\necho '// formatted by stub'\n").unwrap();
    let mut perms = fs::metadata(&stub).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&stub, perms).unwrap();

    let status = command(&dir)
        .env("VALIDATION_GEN_GOFMT_BIN", &stub)
        .args(["--input", "service.go", "--gofmt"])
        .status()
        .expect("run cli");
    assert!(status.success());
    let written = fs::read_to_string(dir.join("service_gen.go")).unwrap();
    assert!(written.ends_with("// formatted by stub\n"));

    fs::remove_dir_all(&dir).unwrap();
}
