//! End-to-end tests for the `runs` binary
#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn runs_in(dir: &TempDir, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("runs").unwrap();
    cmd.current_dir(dir.path()).args(args);
    cmd
}

#[test]
fn test_help_mentions_subcommands() {
    let dir = TempDir::new().unwrap();
    runs_in(&dir, &["--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("check-output"));
}

#[test]
fn test_check_output_prints_each_result_in_order() {
    let dir = TempDir::new().unwrap();
    let output = runs_in(&dir, &["check-output", "--no-config"])
        .write_stdin("echo \"BEGIN\"   # marker\nls -a -1\necho \"END\"\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("BEGIN\n"));
    assert!(text.ends_with("END\n"));
    assert!(text.contains(".\n..\n"));
}

#[test]
fn test_failure_names_the_line_and_stops() {
    let dir = TempDir::new().unwrap();
    runs_in(&dir, &["check-call", "--no-config"])
        .write_stdin("false\necho never\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("never").not())
        .stderr(predicate::str::contains("Command `false` failed"));
}

#[test]
fn test_keep_going_skips_failures() {
    let dir = TempDir::new().unwrap();
    runs_in(&dir, &["check-call", "--no-config", "--keep-going"])
        .write_stdin("false\necho ok\n")
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn test_on_exception_prefix_reports_line() {
    let dir = TempDir::new().unwrap();
    runs_in(&dir, &["check-call", "--no-config", "--on-exception=!!"])
        .write_stdin("false  # expected\necho ok\n")
        .assert()
        .success()
        .stdout("ok\n")
        .stderr(predicate::str::contains("!! false  # expected"));
}

#[test]
fn test_echo_prints_physical_lines() {
    let dir = TempDir::new().unwrap();
    runs_in(&dir, &["call", "--no-config", "--echo"])
        .write_stdin("echo hi\n")
        .assert()
        .success()
        .stdout("$ echo hi\nhi\n");
}

#[test]
fn test_call_exits_with_last_failing_status() {
    let dir = TempDir::new().unwrap();
    runs_in(&dir, &["call", "--no-config"])
        .write_stdin("sh -c 'exit 3'\necho after\n")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("after"));
}

#[test]
fn test_shell_mode_quotes_tokens() {
    let dir = TempDir::new().unwrap();
    runs_in(&dir, &["check-output", "--no-config", "--shell"])
        .write_stdin("echo 'a  b' $HOME\n")
        .assert()
        .success()
        .stdout("a  b $HOME\n");
}

#[test]
fn test_dry_run_launches_nothing() {
    let dir = TempDir::new().unwrap();
    runs_in(&dir, &["call", "--no-config", "--dry-run"])
        .write_stdin("touch created.txt\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("argv: [\"touch\", \"created.txt\"]"));
    assert!(!dir.path().join("created.txt").exists());
}

#[test]
fn test_run_json_record() {
    let dir = TempDir::new().unwrap();
    let output = runs_in(&dir, &["run", "--no-config", "--capture-output", "--json"])
        .write_stdin("echo hello\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value[0]["kind"], "completed");
    assert_eq!(value[0]["value"]["returncode"], 0);
    assert_eq!(value[0]["value"]["stdout"], "hello\n");
    assert_eq!(value[0]["value"]["args"], serde_json::json!(["echo", "hello"]));
}

#[test]
fn test_iterate_streams_json_lines() {
    let dir = TempDir::new().unwrap();
    let output = runs_in(&dir, &["call", "--no-config", "--iterate", "--json"])
        .write_stdin("true\nfalse\n")
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"{"kind":"status","value":0}"#,
            r#"{"kind":"status","value":1}"#
        ]
    );
}

#[test]
fn test_malformed_continuation_is_reported() {
    let dir = TempDir::new().unwrap();
    runs_in(&dir, &["call", "--no-config"])
        .write_stdin("echo hi # comment \\\nmore\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed continuation"));
}

#[test]
fn test_config_file_is_applied() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".runs.json"),
        r#"{"echo": ">", "env": {"RUNS_GREETING": "hey"}}"#,
    )
    .unwrap();
    runs_in(&dir, &["check-output", "--shell"])
        .write_stdin("printenv RUNS_GREETING\n")
        .assert()
        .success()
        .stdout("> printenv RUNS_GREETING\nhey\n");
}

#[test]
fn test_split_json() {
    let dir = TempDir::new().unwrap();
    let output = runs_in(&dir, &["split", "--json"])
        .write_stdin("cargo build \\\n  --release  # optimised\n\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value[0]["line"], "cargo build   --release  # optimised");
    assert_eq!(value[0]["tokens"], serde_json::json!(["cargo", "build", "--release"]));
}

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();
    runs_in(&dir, &["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));
    assert!(dir.path().join(".runs.json").exists());

    runs_in(&dir, &["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_timeout_flag_stops_slow_command() {
    let dir = TempDir::new().unwrap();
    runs_in(&dir, &["check-call", "--no-config", "--timeout", "0.2"])
        .write_stdin("sleep 5\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("timed out"));
}
