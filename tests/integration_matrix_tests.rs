//! # Matrix Walk Integration Tests / 矩阵遍历集成测试
//!
//! Runs complete walks with `run_matrix` and checks the resulting report,
//! the directory layout and the JSON/HTML report files.
//!
//! 使用 `run_matrix` 运行完整遍历，检查生成的报告、目录布局以及 JSON/HTML 报告文件。
#![cfg(unix)]

mod common;

use common::{Fixture, simple_example_files};
use reggie::core::execution::run_matrix;
use reggie::core::models::{BuildPhase, BuildStatus, RunStatus};
use reggie::reporting::{generate_html_report, write_json_report};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod walk_tests {
    use super::*;

    #[tokio::test]
    async fn test_single_build_three_examples() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\nOPT = ON\n");
        for name in ["one", "two", "three"] {
            fixture.example(name, &simple_example_files());
        }

        let report = run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap();

        assert_eq!(report.builds.len(), 1);
        let build = &report.builds[0];
        assert!(matches!(build.status, BuildStatus::Compiled { .. }));
        assert_eq!(build.examples.len(), 3);
        let names: Vec<_> = build.examples.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["one", "three", "two"]);
        assert!(!report.has_failures());
        assert!(
            fixture
                .output_dir
                .join("build_0000/example_002/command_line_000/run_000/parameter.ini")
                .is_file()
        );
    }

    #[tokio::test]
    async fn test_failing_build_has_no_descendants_and_siblings_continue() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\nBROKEN = ON, OFF\n");
        fixture.example("case", &simple_example_files());

        let report = run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap();

        assert_eq!(report.builds.len(), 2);
        let failed = &report.builds[0];
        match &failed.status {
            BuildStatus::Failed { phase, return_code, .. } => {
                assert_eq!(*phase, BuildPhase::Configure);
                assert_eq!(*return_code, Some(3));
            }
            other => panic!("expected a failed build, got {:?}", other),
        }
        assert!(failed.examples.is_empty());
        assert_eq!(failed.directory, Path::new("build_0000"));
        assert!(!fixture.output_dir.join("build_0000/example_000").exists());

        let ok = &report.builds[1];
        assert!(matches!(ok.status, BuildStatus::Compiled { .. }));
        assert_eq!(ok.examples.len(), 1);
        assert!(report.has_failures());
        assert_eq!(report.totals().builds_failed, 1);
    }

    #[tokio::test]
    async fn test_missing_binary_is_recorded_per_build() {
        let fixture = Fixture::new();
        fixture.builds("OPT = ON\n");
        fixture.example("case", &simple_example_files());

        let report = run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap();
        assert!(matches!(
            report.builds[0].status,
            BuildStatus::Failed { phase: BuildPhase::MissingBinary, .. }
        ));
        assert!(!fixture.output_dir.join("build_0000").exists());
    }

    #[tokio::test]
    async fn test_second_walk_reuses_binaries() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\nOPT = ON, OFF\n");
        fixture.example("case", &simple_example_files());

        run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap();
        let report = run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap();

        assert!(report.builds.iter().all(|b| b.status == BuildStatus::Cached));
        assert_eq!(report.totals().runs_passed, 2);
        let make_log = fs::read_to_string(fixture.output_dir.join("build_0001/make.log")).unwrap();
        assert_eq!(make_log.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_rerun_clears_stale_run_outputs() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\n");
        fixture.example("case", &simple_example_files());

        run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap();
        let run_dir = fixture.output_dir.join("build_0000/example_000/command_line_000/run_000");
        fs::write(run_dir.join("solution_0001.h5"), "old result").unwrap();
        fs::create_dir_all(run_dir.join("restart")).unwrap();

        let report = run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap();
        assert!(!report.has_failures());
        assert!(!run_dir.join("solution_0001.h5").exists());
        assert!(!run_dir.join("restart").exists());
        assert!(run_dir.join("mesh.h5").is_file());
        assert!(run_dir.join("parameter.ini").is_file());
    }

    #[tokio::test]
    async fn test_failing_runs_do_not_stop_siblings() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\n");
        fixture.example(
            "case",
            &[("command_line.ini", "variant = a, b\n"), ("run.ini", "fail = no, yes, no\n")],
        );

        let report = run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap();
        let statuses: Vec<_> = report.runs().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                RunStatus::Passed,
                RunStatus::Failed,
                RunStatus::Passed,
                RunStatus::Passed,
                RunStatus::Failed,
                RunStatus::Passed,
            ]
        );
        let totals = report.totals();
        assert_eq!(totals.runs, 6);
        assert_eq!(totals.runs_failed, 2);
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn test_parallel_runs_keep_index_order() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\n");
        fixture.example(
            "case",
            &[("command_line.ini", "variant = a\n"), ("run.ini", "sleep = 0.3, 0.1, 0\n")],
        );
        let mut settings = fixture.settings();
        settings.run.jobs = 3;

        let report = run_matrix(&settings, CancellationToken::new()).await.unwrap();
        let indices: Vec<_> = report.runs().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(report.runs().all(|r| r.status == RunStatus::Passed));
    }

    #[tokio::test]
    async fn test_run_timeout_is_reported() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\n");
        fixture.example("case", &[("command_line.ini", "variant = a\n"), ("run.ini", "sleep = 5\n")]);
        let mut settings = fixture.settings();
        settings.run.timeout_secs = Some(1);

        let report = run_matrix(&settings, CancellationToken::new()).await.unwrap();
        let run = report.runs().next().unwrap();
        assert_eq!(run.status, RunStatus::TimedOut);
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn test_cancelled_walk_skips_everything() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\nOPT = ON, OFF\n");
        fixture.example("case", &simple_example_files());

        let token = CancellationToken::new();
        token.cancel();
        let report = run_matrix(&fixture.settings(), token).await.unwrap();

        assert!(report.cancelled);
        assert!(report.builds.iter().all(|b| b.status == BuildStatus::Skipped));
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn test_cancel_while_last_build_runs() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\n");
        fixture.example("case", &[("command_line.ini", "variant = a, b\n"), ("run.ini", "sleep = 5, 5\n")]);

        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1000)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let report = run_matrix(&fixture.settings(), token).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(report.builds[0].status, BuildStatus::Compiled { .. }));
        assert!(report.cancelled);
        assert!(report.has_failures());
        assert!(report.runs().all(|r| r.status == RunStatus::Skipped));
        // the runs of the second command line are never set up
        let example = &report.builds[0].examples[0];
        assert_eq!(example.command_lines.len(), 1);
        assert!(
            !fixture
                .output_dir
                .join("build_0000/example_000/command_line_001/run_000")
                .exists()
        );
    }

    #[tokio::test]
    async fn test_failed_build_is_retried_on_the_next_walk() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\n");
        fixture.example("case", &simple_example_files());
        let mut settings = fixture.settings();
        settings.build.make_program = fixture.make_that_fails_late();

        for _ in 0..2 {
            let report = run_matrix(&settings, CancellationToken::new()).await.unwrap();
            assert!(matches!(
                report.builds[0].status,
                BuildStatus::Failed { phase: BuildPhase::Compile, return_code: Some(2), .. }
            ));
            assert!(report.builds[0].examples.is_empty());
            assert!(report.has_failures());
        }
        let make_log = fs::read_to_string(fixture.output_dir.join("build_0000/make.log")).unwrap();
        assert_eq!(make_log.lines().count(), 2);
    }
}

#[cfg(test)]
mod declaration_error_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_run_declaration_is_fatal() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\n");
        fixture.example("case", &[("command_line.ini", "variant = a\n")]);

        let err = run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("run.ini"));
    }

    #[tokio::test]
    async fn test_malformed_analyze_disables_analysis_only() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\n");
        let mut files = simple_example_files();
        files.push(("analyze.ini", "this is not a declaration\n"));
        fixture.example("case", &files);

        let report = run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap();
        let example = &report.builds[0].examples[0];
        assert!(example.analyzes.is_empty());
        assert!(example.analysis_error.as_deref().unwrap_or_default().contains("analyze.ini"));
        assert_eq!(report.totals().runs_passed, 1);
    }

    #[tokio::test]
    async fn test_analyzes_are_reported() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\n");
        let mut files = simple_example_files();
        files.push(("analyze.ini", "L2 = 1e-8, 1e-6\n"));
        fixture.example("case", &files);

        let report = run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap();
        let example = &report.builds[0].examples[0];
        assert_eq!(example.analyzes.len(), 2);
        assert_eq!(example.analyzes[1].parameters.get("L2"), Some("1e-6"));
        assert!(example.analysis_error.is_none());
    }

    #[tokio::test]
    async fn test_missing_check_dir_is_an_error() {
        let fixture = Fixture::new();
        let mut settings = fixture.settings();
        settings.check_dir = fixture.root().join("nowhere");
        assert!(run_matrix(&settings, CancellationToken::new()).await.is_err());
    }
}

#[cfg(test)]
mod report_file_tests {
    use super::*;

    #[tokio::test]
    async fn test_json_and_html_reports() {
        let fixture = Fixture::new();
        fixture.builds("binary = solver\nBROKEN = ON, OFF\n");
        fixture.example("case", &simple_example_files());

        let report = run_matrix(&fixture.settings(), CancellationToken::new()).await.unwrap();

        let json_path = fixture.root().join("reports/report.json");
        write_json_report(&report, &json_path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["builds"][0]["status"]["status"], "failed");
        assert_eq!(json["builds"][0]["status"]["phase"], "configure");
        assert_eq!(json["builds"][1]["configuration"]["BROKEN"], "OFF");
        assert_eq!(
            json["builds"][1]["examples"][0]["command_lines"][0]["runs"][0]["status"],
            "passed"
        );

        let html_path = fixture.root().join("report.html");
        generate_html_report(&report, &html_path, "en").unwrap();
        let html = fs::read_to_string(&html_path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Regression Matrix Report"));
        assert!(html.contains("BROKEN is not supported"));
        assert!(html.contains("build_0001"));
    }
}
