//! # Console Reporting Module / 控制台报告模块
//!
//! Prints the end-of-walk summary and the details of everything that failed,
//! colored and localized.
//!
//! 打印遍历结束时的摘要以及所有失败项的详细信息，带颜色并支持本地化。

use colored::*;

use crate::core::models::{BuildStatus, MatrixReport, RunStatus};
use crate::infra::fmt::{indent, seconds};
use crate::infra::t;

/// Prints one line per build and per run, followed by the totals.
///
/// 为每个构建和每个运行打印一行，然后打印总计。
///
/// # Output Format / 输出格式
/// ```text
/// --- Matrix Summary ---
///   build_0000  Compiled      12.31s  OPT: ON
///     example_000 (cavity)
///       - Passed    | command_line_000/run_000              |   1.02s
///       - Failed    | command_line_000/run_001              |   0.40s
/// ```
pub fn print_summary(report: &MatrixReport, locale: &str) {
    println!("\n{}", t!("report.summary_banner", locale = locale).bold());

    for build in &report.builds {
        let status_str = build.status.get_status_str(locale);
        let status_colored = match &build.status {
            BuildStatus::Compiled { .. } | BuildStatus::Cached => status_str.green(),
            BuildStatus::Failed { .. } => status_str.red(),
            BuildStatus::Skipped => status_str.dimmed(),
        };
        let duration = match &build.status {
            BuildStatus::Compiled { duration_secs } => seconds(*duration_secs),
            _ => "N/A".to_string(),
        };
        println!(
            "  {:<12} {:<12} {:>9}  {}",
            build.directory.display(),
            status_colored,
            duration,
            build.configuration
        );

        for example in &build.examples {
            println!(
                "{}",
                indent(&format!("{} ({})", example.directory.display(), example.name.cyan()), 2)
            );
            for command_line in &example.command_lines {
                for run in &command_line.runs {
                    let status_str = run.status.get_status_str(locale);
                    let status_colored = match run.status {
                        RunStatus::Passed => status_str.green(),
                        RunStatus::Skipped => status_str.dimmed(),
                        RunStatus::TimedOut => status_str.yellow(),
                        RunStatus::Failed | RunStatus::Error => status_str.red(),
                    };
                    let relative = run
                        .directory
                        .strip_prefix(&example.directory)
                        .unwrap_or(&run.directory);
                    println!(
                        "      - {:<10} | {:<40} | {:>9}",
                        status_colored,
                        relative.display(),
                        seconds(run.execution_time_secs)
                    );
                }
            }
        }
    }

    let totals = report.totals();
    println!(
        "\n{}",
        t!(
            "report.totals",
            locale = locale,
            builds = totals.builds,
            builds_failed = totals.builds_failed,
            examples = totals.examples,
            runs = totals.runs,
            passed = totals.runs_passed,
            failed = totals.runs_failed,
            skipped = totals.runs_skipped
        )
        .bold()
    );
    println!(
        "{}",
        t!("report.output_location", locale = locale, path = report.output_directory.display())
    );
}

/// Prints the captured output of every failed build and run.
/// Does nothing when nothing failed.
///
/// 打印每个失败的构建和运行的捕获输出。没有失败时不执行任何操作。
pub fn print_failure_details(report: &MatrixReport, locale: &str) {
    let failed_builds: Vec<_> = report
        .builds
        .iter()
        .filter(|b| b.status.is_failure())
        .collect();
    let failed_runs: Vec<_> = report.runs().filter(|r| r.status.is_failure()).collect();
    let total = failed_builds.len() + failed_runs.len();
    if total == 0 {
        return;
    }

    println!("\n{}", t!("report.failure_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    let mut position = 0;
    for build in failed_builds {
        position += 1;
        if let BuildStatus::Failed {
            phase,
            return_code,
            output,
        } = &build.status
        {
            println!(
                "[{}/{}] {} '{}' ({}, {})",
                position,
                total,
                t!("report.header_build_failure", locale = locale).red(),
                build.directory.display().to_string().cyan(),
                phase,
                return_code.map_or_else(|| "-".to_string(), |c| c.to_string())
            );
            println!("\n--- {} ---\n", t!("report.build_log", locale = locale).yellow());
            println!("{}", output);
            println!("\n{}", "-".repeat(80));
        }
    }

    for run in failed_runs {
        position += 1;
        println!(
            "[{}/{}] {} '{}' ({})",
            position,
            total,
            t!("report.header_run_failure", locale = locale).red(),
            run.directory.display().to_string().cyan(),
            run.status.get_status_str(locale)
        );
        println!("$ {}", run.command.join(" "));
        println!("\n--- {} ---\n", t!("report.run_log", locale = locale).yellow());
        println!("{}", run.output);
        println!("\n{}", "-".repeat(80));
    }
}
