//! # Data Models Module / 数据模型模块
//!
//! This module defines the data structures shared by the stages and the
//! reporting layer: execution status, the build failure error, run outcomes
//! and the serialisable report tree produced by one matrix walk.
//!
//! 此模块定义阶段与报告层共享的数据结构：执行状态、构建失败错误、
//! 运行结果以及一次矩阵遍历产生的可序列化报告树。

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::params::ParameterMapping;
use crate::core::tree::NodeId;
use crate::infra::t;

/// Execution status carried by the stages that run subprocesses.
/// 运行子进程的阶段所携带的执行状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageStatus {
    /// `None` until the stage ran a subprocess.
    /// 在阶段运行子进程之前为 `None`。
    pub return_code: Option<i32>,
    pub successful: bool,
}

impl Default for StageStatus {
    fn default() -> Self {
        Self {
            return_code: None,
            successful: true,
        }
    }
}

impl StageStatus {
    /// Records a subprocess exit; anything but `Some(0)` marks the stage failed.
    pub fn record(&mut self, return_code: Option<i32>) {
        self.return_code = return_code;
        if return_code != Some(0) {
            self.successful = false;
        }
    }
}

/// The step of a build that failed.
/// 构建失败的步骤。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    /// The configuration has no `binary` entry, nothing was attempted.
    /// 配置中没有 `binary` 条目，未执行任何操作。
    MissingBinary,
    /// The configure (`cmake`) step failed.
    Configure,
    /// The compile (`make`) step failed.
    Compile,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildPhase::MissingBinary => "missing binary",
            BuildPhase::Configure => "configure",
            BuildPhase::Compile => "compile",
        };
        f.write_str(s)
    }
}

/// Raised by `Build::compile`. Fatal for the failing build's subtree only:
/// the matrix driver records it and moves on to the next build.
///
/// 由 `Build::compile` 抛出。仅对失败构建的子树是致命的：
/// 矩阵驱动程序会记录它并继续下一个构建。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFailed {
    /// The failing build's node.
    pub build: NodeId,
    pub target_directory: PathBuf,
    pub phase: BuildPhase,
    pub return_code: Option<i32>,
    /// Captured output of the failing step.
    /// 失败步骤的捕获输出。
    pub output: String,
}

impl fmt::Display for BuildFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "build.compile failed in directory '{}' ({})",
            self.target_directory.display(),
            self.phase
        )
    }
}

impl std::error::Error for BuildFailed {}

/// How a successful `compile` call was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// The binary already existed, no subprocess was started.
    /// 二进制文件已存在，未启动任何子进程。
    Cached,
    Compiled { duration: Duration },
}

/// The recorded result of executing one run. Never an error: a failing
/// simulation is data for the aggregator.
///
/// 执行一次运行的记录结果。永远不是错误：失败的模拟是聚合器的数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub return_code: Option<i32>,
    pub execution_time: Duration,
    pub successful: bool,
    pub timed_out: bool,
    pub output: String,
}

// ------------------------------------------------------------------------------------------------
// Report tree / 报告树
// ------------------------------------------------------------------------------------------------

/// Everything one matrix walk produced.
/// 一次矩阵遍历产生的所有结果。
#[derive(Debug, Clone, Serialize)]
pub struct MatrixReport {
    pub started_at: DateTime<Local>,
    pub output_directory: PathBuf,
    pub builds: Vec<BuildReport>,
    /// `true` if the walk was interrupted before it finished.
    pub cancelled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub index: usize,
    pub directory: PathBuf,
    pub configuration: ParameterMapping,
    pub binary_path: PathBuf,
    pub cmake_cmd: Vec<String>,
    pub status: BuildStatus,
    pub examples: Vec<ExampleReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildStatus {
    Compiled {
        duration_secs: f64,
    },
    Cached,
    Failed {
        phase: BuildPhase,
        return_code: Option<i32>,
        output: String,
    },
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExampleReport {
    pub index: usize,
    pub name: String,
    pub source_directory: PathBuf,
    pub directory: PathBuf,
    pub analyzes: Vec<AnalyzeReport>,
    /// Why analysis was disabled for this example, if it was.
    /// 如果此示例的分析被禁用，记录原因。
    pub analysis_error: Option<String>,
    pub command_lines: Vec<CommandLineReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeReport {
    pub index: usize,
    pub parameters: ParameterMapping,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandLineReport {
    pub index: usize,
    pub directory: PathBuf,
    pub parameters: ParameterMapping,
    pub runs: Vec<RunReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub index: usize,
    pub directory: PathBuf,
    pub parameters: ParameterMapping,
    pub command: Vec<String>,
    pub status: RunStatus,
    pub return_code: Option<i32>,
    pub execution_time_secs: f64,
    pub output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Passed,
    Failed,
    TimedOut,
    /// The run could not be started (parameter file or spawn failure).
    /// 运行无法启动（参数文件或派生失败）。
    Error,
    Skipped,
}

impl RunStatus {
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        if outcome.successful {
            RunStatus::Passed
        } else if outcome.timed_out {
            RunStatus::TimedOut
        } else {
            RunStatus::Failed
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, RunStatus::Failed | RunStatus::TimedOut | RunStatus::Error)
    }

    /// Gets the status as a localized string for display.
    /// 以本地化字符串形式获取状态以供显示。
    pub fn get_status_str(self, locale: &str) -> String {
        match self {
            RunStatus::Passed => t!("report.status_passed", locale = locale).to_string(),
            RunStatus::Failed => t!("report.status_failed", locale = locale).to_string(),
            RunStatus::TimedOut => t!("report.status_timeout", locale = locale).to_string(),
            RunStatus::Error => t!("report.status_error", locale = locale).to_string(),
            RunStatus::Skipped => t!("report.status_skipped", locale = locale).to_string(),
        }
    }

    /// Gets the appropriate CSS class for the status.
    pub fn get_status_class(self) -> &'static str {
        match self {
            RunStatus::Passed => "status-passed",
            RunStatus::Failed | RunStatus::Error => "status-failed",
            RunStatus::TimedOut => "status-timeout",
            RunStatus::Skipped => "status-skipped",
        }
    }
}

impl BuildStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, BuildStatus::Failed { .. })
    }

    pub fn get_status_str(&self, locale: &str) -> String {
        match self {
            BuildStatus::Compiled { .. } => t!("report.build_compiled", locale = locale).to_string(),
            BuildStatus::Cached => t!("report.build_cached", locale = locale).to_string(),
            BuildStatus::Failed { .. } => t!("report.build_failed", locale = locale).to_string(),
            BuildStatus::Skipped => t!("report.status_skipped", locale = locale).to_string(),
        }
    }
}

/// Aggregate counts over a report.
/// 报告的汇总计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub builds: usize,
    pub builds_failed: usize,
    pub examples: usize,
    pub runs: usize,
    pub runs_passed: usize,
    pub runs_failed: usize,
    pub runs_skipped: usize,
}

impl MatrixReport {
    pub fn new(output_directory: PathBuf) -> Self {
        Self {
            started_at: Local::now(),
            output_directory,
            builds: Vec::new(),
            cancelled: false,
        }
    }

    /// Iterates over every run in the report, in walk order.
    pub fn runs(&self) -> impl Iterator<Item = &RunReport> {
        self.builds
            .iter()
            .flat_map(|b| &b.examples)
            .flat_map(|e| &e.command_lines)
            .flat_map(|c| &c.runs)
    }

    pub fn totals(&self) -> Totals {
        let mut totals = Totals {
            builds: self.builds.len(),
            builds_failed: self.builds.iter().filter(|b| b.status.is_failure()).count(),
            examples: self.builds.iter().map(|b| b.examples.len()).sum(),
            ..Totals::default()
        };
        for run in self.runs() {
            totals.runs += 1;
            match run.status {
                RunStatus::Passed => totals.runs_passed += 1,
                RunStatus::Skipped => totals.runs_skipped += 1,
                _ => totals.runs_failed += 1,
            }
        }
        totals
    }

    /// A walk fails if any build failed, any run failed, or it was cancelled.
    /// 如果任何构建失败、任何运行失败或遍历被取消，则遍历失败。
    pub fn has_failures(&self) -> bool {
        let totals = self.totals();
        self.cancelled || totals.builds_failed > 0 || totals.runs_failed > 0
    }
}
