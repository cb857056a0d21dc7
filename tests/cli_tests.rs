use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

const SAMPLE_STREAM: &str = "TAP version 14
1..2
ok 1 - test1
  1..2
  ok 1 - test2
  not ok 2 - test3
ok 2 - test4
  1..2
  ok 1 - test5
  not ok 2 - test6
";

/// Runs the bundled sample tree and asserts that stdout carries exactly the
/// protocol stream. Failing test points do not change the exit code.
///
/// 运行内置示例测试树，断言 stdout 只包含协议流。失败的测试点不会改变退出码。
#[test]
fn test_sample_run_prints_exact_stream() {
    let mut cmd = Command::cargo_bin("quicktap").unwrap();

    cmd.assert().success().stdout(SAMPLE_STREAM);
}

/// `--details` adds YAML blocks under each failing point.
///
/// `--details` 会在每个失败的测试点下添加 YAML 块。
#[test]
fn test_details_flag_adds_yaml_blocks() {
    let mut cmd = Command::cargo_bin("quicktap").unwrap();
    cmd.arg("--details");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("  not ok 2 - test3\n    ---\n"))
        .stdout(predicate::str::contains("    message: \"expected 3, got 2\""))
        .stdout(predicate::str::contains("    severity: fail"));
}

/// The summary goes to stderr and leaves stdout untouched.
///
/// 摘要写入 stderr，不影响 stdout。
#[test]
fn test_summary_is_written_to_stderr() {
    let mut cmd = Command::cargo_bin("quicktap").unwrap();
    cmd.arg("--summary");

    cmd.assert()
        .success()
        .stdout(SAMPLE_STREAM)
        .stderr(predicate::str::contains("--- Test Summary ---"))
        .stderr(predicate::str::contains("TESTS FAILED"));
}

/// Settings are read from a TOML file passed with `--config`.
///
/// 通过 `--config` 传入的 TOML 文件读取设置。
#[test]
fn test_config_file_enables_details() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "details = true").unwrap();

    let mut cmd = Command::cargo_bin("quicktap").unwrap();
    cmd.arg("--config").arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("    ---"));
}

/// A missing configuration file is a usage error and fails the process.
///
/// 缺失的配置文件属于用法错误，进程以失败退出。
#[test]
fn test_missing_config_file_fails() {
    let mut cmd = Command::cargo_bin("quicktap").unwrap();
    cmd.arg("--config").arg("tests/fixtures/does_not_exist.toml");

    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to read configuration file"));
}
