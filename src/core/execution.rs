//! # Matrix Execution Engine Module / 矩阵执行引擎模块
//!
//! Walks the whole matrix: builds are compiled one after another, and for
//! every build that succeeds its compatible examples, their command lines and
//! analyses, and finally the runs are expanded and executed.
//!
//! 遍历整个矩阵：构建逐个编译，对每个成功的构建，
//! 展开并执行其兼容的示例、命令行和分析，最后是运行。
//!
//! ## Failure semantics / 失败语义
//!
//! - A failing build is caught here, recorded, and its subtree is never
//!   constructed. The next build proceeds.
//! - A failing run is recorded; its siblings proceed.
//! - Malformed declaration files abort the walk with an error.
//!
//! - 失败的构建在此被捕获并记录，其子树永远不会被构造。下一个构建继续进行。
//! - 失败的运行被记录；其兄弟运行继续进行。
//! - 格式错误的声明文件会以错误中止遍历。

use anyhow::{Context, Result, anyhow};
use colored::*;
use futures::{StreamExt, stream};
use std::fs;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::core::config::{BuildSettings, DeclarationFiles, RegressionConfig, RunSettings};
use crate::core::models::{
    AnalyzeReport, BuildReport, BuildState, BuildStatus, CommandLineReport, ExampleReport,
    MatrixReport, RunReport, RunStatus,
};
use crate::core::stages::{
    Build, CommandLine, Example, LaunchSettings, Run, get_analyzes, get_builds, get_command_lines,
    get_examples, get_runs,
};
use crate::core::tree::StageTree;
use crate::infra::command::display_command;
use crate::infra::fs::absolute_path;
use crate::infra::t;

/// Fully resolved inputs of one matrix walk.
/// 一次矩阵遍历的完全解析后的输入。
#[derive(Debug, Clone)]
pub struct MatrixSettings {
    pub base_dir: PathBuf,
    pub check_dir: PathBuf,
    pub output_dir: PathBuf,
    pub build: BuildSettings,
    pub run: RunSettings,
    pub files: DeclarationFiles,
}

impl MatrixSettings {
    /// # Errors
    /// The configuration must name a check directory.
    pub fn from_config(config: &RegressionConfig) -> Result<Self> {
        let check_dir = config
            .check_dir
            .clone()
            .ok_or_else(|| anyhow!("No check directory configured (set `check_dir` or pass --check-dir)"))?;
        Ok(Self {
            base_dir: config.base_dir.clone(),
            check_dir,
            output_dir: config.output_dir.clone(),
            build: config.build.clone(),
            run: config.run.clone(),
            files: config.files.clone(),
        })
    }

    fn launch_settings(&self) -> LaunchSettings {
        LaunchSettings {
            mpi_launcher: self.run.mpi_launcher.clone(),
            timeout: self.run.timeout(),
        }
    }
}

/// Walks the matrix described by `settings` and returns what happened.
///
/// # Arguments
/// * `settings` - Resolved directories, tools and declaration file names
/// * `stop` - Cancelling it skips everything not yet finished
///
/// # Errors
/// Only for problems with the inputs themselves: missing directories,
/// malformed declaration files, invalid command-line parameters, or a run
/// directory that cannot be prepared. Build and run failures are recorded in
/// the report instead.
///
/// 遍历 `settings` 描述的矩阵并返回结果。
/// 仅在输入本身有问题时返回错误；构建和运行失败会记录在报告中。
pub async fn run_matrix(settings: &MatrixSettings, stop: CancellationToken) -> Result<MatrixReport> {
    fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!("Failed to create output directory: {}", settings.output_dir.display())
    })?;
    let output_dir = absolute_path(&settings.output_dir)?;
    let check_dir = absolute_path(&settings.check_dir)?;
    let base_dir = absolute_path(&settings.base_dir)?;

    let mut tree = StageTree::new(&output_dir);
    let mut report = MatrixReport::new(output_dir.clone());

    let builds_file = check_dir.join(&settings.files.builds);
    let builds = get_builds(&mut tree, &base_dir, &builds_file, &settings.build)?;
    println!(
        "{}",
        t!("matrix.total_builds", count = builds.len()).bold()
    );

    let build_jobs = settings.build.effective_jobs();
    for mut build in builds {
        let mut build_report = new_build_report(&tree, &build);

        if stop.is_cancelled() {
            report.cancelled = true;
            report.builds.push(build_report);
            continue;
        }

        println!("{}", "-".repeat(80));
        println!("{}", build);

        let compiled = tokio::select! {
            biased;
            _ = stop.cancelled() => None,
            result = build.compile(build_jobs, None) => Some(result),
        };

        match compiled {
            None => {
                report.cancelled = true;
            }
            Some(Err(failed)) => {
                eprintln!("{}", failed.to_string().red());
                build_report.status = BuildStatus::Failed {
                    phase: failed.phase,
                    return_code: failed.return_code,
                    output: failed.output,
                };
            }
            Some(Ok(state)) => {
                build_report.status = match state {
                    BuildState::Cached => BuildStatus::Cached,
                    BuildState::Compiled { duration } => BuildStatus::Compiled {
                        duration_secs: duration.as_secs_f64(),
                    },
                };
                let examples =
                    get_examples(&mut tree, &check_dir, &build, &settings.files.exclude_build)?;
                for example in examples {
                    if stop.is_cancelled() {
                        break;
                    }
                    let example_report =
                        walk_example(&mut tree, &build, example, settings, &stop).await?;
                    build_report.examples.push(example_report);
                }
            }
        }

        report.builds.push(build_report);
    }

    report.cancelled |= stop.is_cancelled();
    if report.cancelled {
        println!("{}", t!("matrix.cancelled").yellow());
    }
    Ok(report)
}

fn new_build_report(tree: &StageTree, build: &Build) -> BuildReport {
    BuildReport {
        index: build.index,
        directory: tree.relative_directory(build.id),
        configuration: build.configuration.clone(),
        binary_path: build.binary_path.clone(),
        cmake_cmd: build.cmake_cmd.clone(),
        status: BuildStatus::Skipped,
        examples: Vec::new(),
    }
}

/// Expands and executes everything below one example.
async fn walk_example(
    tree: &mut StageTree,
    build: &Build,
    example: Example,
    settings: &MatrixSettings,
    stop: &CancellationToken,
) -> Result<ExampleReport> {
    println!("{}", example);
    let files = &settings.files;

    let command_lines =
        get_command_lines(tree, &example.declaration(&files.command_line), &example)?;

    let (analyzes, analysis_error) =
        match get_analyzes(tree, &example.declaration(&files.analyze), &example) {
            Ok(analyzes) => (analyzes, None),
            Err(e) => {
                let message = format!("{:#}", e);
                println!(
                    "{}",
                    t!("matrix.analysis_disabled", name = &example.name, error = &message).yellow()
                );
                (Vec::new(), Some(message))
            }
        };
    for analyze in &analyzes {
        println!("{}", analyze);
    }

    let mut example_report = ExampleReport {
        index: example.index,
        name: example.name.clone(),
        source_directory: example.source_directory.clone(),
        directory: tree.relative_directory(example.id),
        analyzes: analyzes
            .iter()
            .map(|a| AnalyzeReport {
                index: a.index,
                parameters: a.parameters.clone(),
            })
            .collect(),
        analysis_error,
        command_lines: Vec::new(),
    };

    let run_file = example.declaration(&files.run);
    for command_line in command_lines {
        // no new run directories once the walk is cancelled
        if stop.is_cancelled() {
            break;
        }
        println!("{}", command_line);
        let runs = get_runs(tree, &run_file, &command_line)?;
        let runs = runs
            .into_iter()
            .map(|run| {
                let directory = tree.relative_directory(run.id);
                (run, directory)
            })
            .collect();
        let run_reports = execute_runs(runs, build, &command_line, settings, stop).await;

        example_report.command_lines.push(CommandLineReport {
            index: command_line.index,
            directory: tree.relative_directory(command_line.id),
            parameters: command_line.parameters.clone(),
            runs: run_reports,
        });
    }

    Ok(example_report)
}

/// Executes the runs of one command line, at most `run.jobs` at a time.
/// Reports come back in index order regardless of completion order.
///
/// 执行一个命令行下的运行，最多同时执行 `run.jobs` 个。
/// 无论完成顺序如何，报告都按索引顺序返回。
async fn execute_runs(
    runs: Vec<(Run, PathBuf)>,
    build: &Build,
    command_line: &CommandLine,
    settings: &MatrixSettings,
    stop: &CancellationToken,
) -> Vec<RunReport> {
    let launch = settings.launch_settings();
    let jobs = settings.run.jobs.max(1);

    stream::iter(
        runs.into_iter()
            .map(|(run, directory)| execute_run(run, directory, build, command_line, &launch, stop)),
    )
    .buffered(jobs)
    .collect()
    .await
}

async fn execute_run(
    mut run: Run,
    directory: PathBuf,
    build: &Build,
    command_line: &CommandLine,
    launch: &LaunchSettings,
    stop: &CancellationToken,
) -> RunReport {
    let command = run.command(build, command_line, &launch.mpi_launcher);
    let mut report = RunReport {
        index: run.index,
        directory,
        parameters: run.parameters.clone(),
        command: command.clone(),
        status: RunStatus::Skipped,
        return_code: None,
        execution_time_secs: 0.0,
        output: String::new(),
    };

    if stop.is_cancelled() {
        return report;
    }

    println!("{}", run);
    println!(
        "{}",
        t!("run.running", command = display_command(&command)).blue()
    );

    let result = tokio::select! {
        biased;
        _ = stop.cancelled() => None,
        result = run.execute(build, command_line, launch) => Some(result),
    };

    match result {
        None => {}
        Some(Ok(outcome)) => {
            report.status = RunStatus::from_outcome(&outcome);
            report.return_code = outcome.return_code;
            report.execution_time_secs = outcome.execution_time.as_secs_f64();
            report.output = outcome.output;
            print_run_line(&report);
        }
        Some(Err(e)) => {
            report.status = RunStatus::Error;
            report.output = format!("{:#}", e);
            print_run_line(&report);
        }
    }
    report
}

fn print_run_line(report: &RunReport) {
    let duration = format!("{:.2}", report.execution_time_secs);
    let path = report.directory.display();
    let line = match report.status {
        RunStatus::Passed => t!("run.passed", path = path, duration = duration).green(),
        RunStatus::TimedOut => t!("run.timed_out", path = path).red(),
        RunStatus::Error => t!("run.error", path = path, error = &report.output).red(),
        _ => t!(
            "run.failed",
            path = path,
            code = report
                .return_code
                .map_or_else(|| "-".to_string(), |c| c.to_string()),
            duration = duration
        )
        .red(),
    };
    println!("{}", line);
}
