//! # CLI Tests / 命令行测试
//!
//! Runs the `reggie` binary end to end against a scratch check directory and
//! a fake toolchain, asserting on exit codes and console output.
//!
//! 针对临时检查目录和伪工具链端到端运行 `reggie` 二进制文件，断言退出码和控制台输出。
#![cfg(unix)]

mod common;

use assert_cmd::prelude::*;
use common::{Fixture, simple_example_files};
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// A successful walk exits 0 and prints the closing success line.
///
/// 成功的遍历以 0 退出并打印结尾的成功信息。
#[test]
fn test_successful_run() {
    let fixture = Fixture::new();
    fixture.builds("binary = solver\nOPT = ON, OFF\n");
    fixture.example("case", &simple_example_files());
    let config = fixture.config_file(1);

    let mut cmd = Command::cargo_bin("reggie").unwrap();
    cmd.arg("--lang").arg("en").arg("run").arg("--config").arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total number of builds: 2"))
        .stdout(predicate::str::contains("All builds and runs succeeded."));

    assert!(
        fixture
            .output_dir
            .join("build_0001/example_000/command_line_000/run_000/std.out")
            .is_file()
    );
}

/// A failing run makes the whole command fail and prints its output.
///
/// 失败的运行会使整个命令失败并打印其输出。
#[test]
fn test_run_failure() {
    let fixture = Fixture::new();
    fixture.builds("binary = solver\n");
    fixture.example("case", &[("command_line.ini", "variant = a\n"), ("run.ini", "fail = yes\n")]);
    let config = fixture.config_file(1);

    let mut cmd = Command::cargo_bin("reggie").unwrap();
    cmd.args(["--lang", "en", "run", "--config"]).arg(&config);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("--- Failure Details ---"))
        .stdout(predicate::str::contains("deliberate failure"))
        .stderr(predicate::str::contains("Regression matrix finished with failures."));
}

/// A build failure is reported with its phase and the walk still finishes.
///
/// 构建失败会连同其阶段一起报告，且遍历仍会完成。
#[test]
fn test_build_failure() {
    let fixture = Fixture::new();
    fixture.builds("binary = solver\nBROKEN = ON\n");
    fixture.example("case", &simple_example_files());
    let config = fixture.config_file(1);

    let mut cmd = Command::cargo_bin("reggie").unwrap();
    cmd.args(["--lang", "en", "run", "--config"]).arg(&config);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Build failure in"))
        .stdout(predicate::str::contains("configure"));
}

/// Command-line flags override the configuration file and write reports.
///
/// 命令行参数覆盖配置文件并写入报告。
#[test]
fn test_overrides_and_report_files() {
    let fixture = Fixture::new();
    fixture.builds("binary = solver\n");
    fixture.example("case", &[("command_line.ini", "variant = a\n"), ("run.ini", "N = 1, 2, 3\n")]);
    let config = fixture.config_file(1);
    let other_out = fixture.root().join("elsewhere");
    let json = fixture.root().join("report.json");
    let html = fixture.root().join("report.html");

    let mut cmd = Command::cargo_bin("reggie").unwrap();
    cmd.args(["--lang", "en", "run", "--config"])
        .arg(&config)
        .arg("--outdir")
        .arg(&other_out)
        .args(["-j", "2", "--timeout", "30"])
        .arg("--json")
        .arg(&json)
        .arg("--html")
        .arg(&html);

    cmd.assert().success();
    assert!(other_out.join("build_0000/example_000/command_line_000/run_002").is_dir());
    assert!(!fixture.output_dir.exists());
    let json_text = fs::read_to_string(&json).unwrap();
    assert!(json_text.contains("\"runs\""));
    assert!(fs::read_to_string(&html).unwrap().contains("<table>"));
}

/// Without a check directory the command fails before doing anything.
///
/// 没有检查目录时，命令在执行任何操作之前失败。
#[test]
fn test_missing_check_dir() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("reggie").unwrap();
    cmd.current_dir(dir.path()).args(["--lang", "en", "run"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No check directory configured"));
}

/// A config path that does not exist is an error.
#[test]
fn test_nonexistent_config_file() {
    let mut cmd = Command::cargo_bin("reggie").unwrap();
    cmd.args(["run", "--config", "definitely/not/here.toml"]);
    cmd.assert().failure();
}

/// Output follows `--lang`.
///
/// 输出语言遵循 `--lang`。
#[test]
fn test_chinese_output() {
    let fixture = Fixture::new();
    fixture.builds("binary = solver\n");
    fixture.example("case", &simple_example_files());
    let config = fixture.config_file(1);

    let mut cmd = Command::cargo_bin("reggie").unwrap();
    cmd.args(["run", "--lang", "zh-CN", "--config"]).arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("所有构建和运行均已成功"));
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("reggie").unwrap();
    cmd.args(["--lang", "en", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("init"));
}

#[cfg(test)]
mod init_tests {
    use super::*;
    use reggie::core::config::load_config;

    #[test]
    fn test_non_interactive_init_writes_default_config() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("reggie.toml");

        let mut cmd = Command::cargo_bin("reggie").unwrap();
        cmd.args(["--lang", "en", "init", "--non-interactive", "--output"]).arg(&output);
        cmd.assert().success().stdout(predicate::str::contains("Created"));

        let config = load_config(&output).unwrap();
        assert_eq!(config.check_dir, Some(dir.path().join("checks")));
    }

    #[test]
    fn test_non_interactive_init_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("reggie.toml");
        fs::write(&output, "language = \"en\"\n").unwrap();

        let mut cmd = Command::cargo_bin("reggie").unwrap();
        cmd.args(["--lang", "en", "init", "--non-interactive", "--output"]).arg(&output);
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
        assert_eq!(fs::read_to_string(&output).unwrap(), "language = \"en\"\n");
    }
}
