#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn deploy(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("deploy").unwrap();
    cmd.current_dir(dir.path())
        .env("TFOPS_ROOT", dir.path())
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

fn add_environment(dir: &TempDir, env: &str, with_vars: bool) -> PathBuf {
    let env_dir = dir.path().join("environments").join(env);
    std::fs::create_dir_all(&env_dir).unwrap();
    if with_vars {
        std::fs::write(env_dir.join("terraform.tfvars"), "instance_type = \"t3.micro\"\n").unwrap();
    }
    env_dir
}

/// Stand-in terraform that logs its argv and touches any `-out=` plan file.
#[cfg(unix)]
fn install_stub_terraform(dir: &TempDir) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let log = dir.path().join("terraform-calls.log");
    let script = dir.path().join("terraform-stub.sh");
    let body = format!(
        r#"#!/bin/sh
echo "$*" >> "{log}"
case "$1" in
  version) echo "Terraform v1.7.5"; echo "on linux_amd64" ;;
  output) echo '{{"bucket": {{"sensitive": false, "type": "string", "value": "state-dev"}}}}' ;;
esac
for a in "$@"; do
  case "$a" in
    -out=*) : > "${{a#-out=}}" ;;
  esac
done
exit 0
"#,
        log = log.display()
    );
    std::fs::write(&script, body).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(
        dir.path().join("tfops.yaml"),
        format!("terraform:\n  binary: {}\n", script.display()),
    )
    .unwrap();
    log
}

fn calls(log: &Path) -> String {
    std::fs::read_to_string(log).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// argument handling
// ---------------------------------------------------------------------------

#[test]
fn unknown_environment_is_rejected_before_running_anything() {
    let dir = TempDir::new().unwrap();
    deploy(&dir)
        .args(["--environment", "qa", "--action", "plan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'qa'"))
        .stdout(predicate::str::contains("Running:").not());
}

#[test]
fn action_is_required() {
    let dir = TempDir::new().unwrap();
    deploy(&dir)
        .args(["--environment", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--action"));
}

#[test]
fn help_lists_examples() {
    let dir = TempDir::new().unwrap();
    deploy(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy --environment dev --action plan"));
}

// ---------------------------------------------------------------------------
// pre-flight failures
// ---------------------------------------------------------------------------

#[test]
fn missing_environment_dir_exits_one() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("environments")).unwrap();
    deploy(&dir)
        .args(["-e", "staging", "-a", "validate"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Deployment failed: environment 'staging' not found"));
}

#[test]
fn invalid_config_exits_one() {
    let dir = TempDir::new().unwrap();
    add_environment(&dir, "dev", true);
    std::fs::write(dir.path().join("tfops.yaml"), "terraform:\n  binary: \"\"\n").unwrap();
    deploy(&dir)
        .args(["-e", "dev", "-a", "plan"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("terraform.binary must not be empty"));
}

#[cfg(unix)]
#[test]
fn missing_var_file_blocks_validate() {
    let dir = TempDir::new().unwrap();
    add_environment(&dir, "dev", false);
    let log = install_stub_terraform(&dir);
    deploy(&dir)
        .args(["-e", "dev", "-a", "validate"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("terraform.tfvars not found"));
    assert_eq!(calls(&log), "version\n");
}

#[test]
fn terraform_not_installed_exits_one() {
    let dir = TempDir::new().unwrap();
    add_environment(&dir, "dev", true);
    std::fs::write(
        dir.path().join("tfops.yaml"),
        "terraform:\n  binary: tfops-no-such-terraform\n",
    )
    .unwrap();
    deploy(&dir)
        .args(["-e", "dev", "-a", "plan"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Terraform not found"));
}

// ---------------------------------------------------------------------------
// actions against a stub terraform
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn plan_writes_named_artifact() {
    let dir = TempDir::new().unwrap();
    let env_dir = add_environment(&dir, "dev", true);
    let log = install_stub_terraform(&dir);

    deploy(&dir)
        .args(["--environment", "dev", "--action", "plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Terraform found: Terraform v1.7.5"))
        .stdout(predicate::str::contains(
            "Action 'plan' completed successfully for environment 'dev'",
        ));

    let log = calls(&log);
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines[0], "version");
    assert_eq!(lines[1], "init");
    assert!(lines[2].starts_with("plan -var-file=terraform.tfvars -out=tfplan-dev-"));

    let artifacts = std::fs::read_dir(&env_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("tfplan-dev-"))
        .count();
    assert_eq!(artifacts, 1);
}

#[cfg(unix)]
#[test]
fn destroy_answered_no_exits_zero_without_destroying() {
    let dir = TempDir::new().unwrap();
    add_environment(&dir, "prod", true);
    let log = install_stub_terraform(&dir);

    deploy(&dir)
        .args(["--environment", "prod", "--action", "destroy"])
        .write_stdin("no\n")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("DESTROY all resources in prod"))
        .stdout(predicate::str::contains("Destroy cancelled by user"));

    assert!(!calls(&log).contains("destroy"));
}

#[cfg(unix)]
#[test]
fn apply_confirmed_applies_saved_plan_and_prints_outputs() {
    let dir = TempDir::new().unwrap();
    add_environment(&dir, "dev", true);
    let log = install_stub_terraform(&dir);

    deploy(&dir)
        .args(["-e", "dev", "-a", "apply", "--skip-init"])
        .write_stdin("Yes\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("  bucket: state-dev"));

    let log = calls(&log);
    assert!(!log.contains("init"));
    let apply = log.lines().find(|l| l.starts_with("apply")).unwrap();
    assert!(apply.starts_with("apply tfplan-dev-"), "{apply}");
    assert!(log.ends_with("output -json\n"));
}

#[cfg(unix)]
#[test]
fn auto_approve_skips_the_prompt() {
    let dir = TempDir::new().unwrap();
    add_environment(&dir, "staging", true);
    let log = install_stub_terraform(&dir);

    deploy(&dir)
        .args(["-e", "staging", "-a", "destroy", "--auto-approve"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(yes/no)").not());

    assert!(calls(&log).contains("destroy -var-file=terraform.tfvars -auto-approve"));
}

// ---------------------------------------------------------------------------
// setup-backend
// ---------------------------------------------------------------------------

#[test]
fn setup_backend_rejects_flags() {
    Command::cargo_bin("setup-backend")
        .unwrap()
        .arg("--environment")
        .assert()
        .failure();
}

#[test]
fn setup_backend_help() {
    Command::cargo_bin("setup-backend")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("DynamoDB lock table"));
}
