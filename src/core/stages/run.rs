//! # Run Stage / 运行阶段
//!
//! One simulation run: a private copy of the example inputs, a generated
//! `parameter.ini`, one invocation of the build's binary. A failing run is a
//! recorded outcome, never an error, so its siblings keep going.
//!
//! 一次模拟运行：示例输入的私有副本、生成的 `parameter.ini`、
//! 对构建二进制文件的一次调用。失败的运行是记录的结果而不是错误，
//! 因此其兄弟运行会继续进行。

use anyhow::{Context, Result};
use colored::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::combinations;
use crate::core::models::{RunOutcome, StageStatus};
use crate::core::params::ParameterMapping;
use crate::core::stages::{Build, CommandLine};
use crate::core::tree::{NodeId, StageKind, StageTree};
use crate::infra::command;
use crate::infra::fmt::indent;
use crate::infra::fs::{copy_dir_contents, reset_dir};
use crate::infra::t;

/// Name of the parameter file written into every run directory.
/// 写入每个运行目录的参数文件名。
pub const PARAMETER_FILE: &str = "parameter.ini";

/// File receiving the captured output of the run.
pub const OUTPUT_FILE: &str = "std.out";

/// Launch settings shared by all runs of a walk.
/// 一次遍历中所有运行共享的启动设置。
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub mpi_launcher: String,
    pub timeout: Option<Duration>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            mpi_launcher: "mpirun".to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Run {
    pub id: NodeId,
    pub index: usize,
    pub target_directory: PathBuf,
    pub parameters: ParameterMapping,
    /// The example directory the inputs were copied from.
    /// 输入文件的来源示例目录。
    pub source_directory: PathBuf,
    pub parameter_path: PathBuf,
    pub status: StageStatus,
    pub outcome: Option<RunOutcome>,
    pub depth: usize,
}

impl Run {
    /// Registers a run below `command_line` and copies the example inputs into
    /// its directory, after emptying whatever an earlier walk left there.
    ///
    /// # Arguments
    /// * `parameters` - One combination of the run declaration
    /// * `declaration_path` - The run declaration file; its directory is the example source
    /// * `command_line` - The owning command line
    ///
    /// 在 `command_line` 下注册一个运行，并将示例输入复制到其目录中。
    pub fn new(
        tree: &mut StageTree,
        parameters: ParameterMapping,
        declaration_path: &Path,
        command_line: &CommandLine,
    ) -> Result<Self> {
        let source_directory = declaration_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let id = tree.add(Some(command_line.id), StageKind::Run)?;
        let node = tree.node(id);
        let target_directory = node.target_directory.clone();

        reset_dir(&target_directory)?;
        copy_dir_contents(&source_directory, &target_directory).with_context(|| {
            format!("Failed to copy example inputs into {}", target_directory.display())
        })?;

        Ok(Self {
            id,
            index: node.index,
            parameter_path: target_directory.join(PARAMETER_FILE),
            target_directory,
            parameters,
            source_directory,
            status: StageStatus::default(),
            outcome: None,
            depth: tree.depth(id),
        })
    }

    /// The full invocation:
    /// `[launcher -np N] <binary_path> parameter.ini [cmd_suffix]`.
    ///
    /// 完整的调用命令：`[launcher -np N] <binary_path> parameter.ini [cmd_suffix]`。
    pub fn command(&self, build: &Build, command_line: &CommandLine, mpi_launcher: &str) -> Vec<String> {
        let mut cmd = Vec::new();
        if let Some(ranks) = command_line.options.mpi_ranks {
            cmd.push(mpi_launcher.to_string());
            cmd.push("-np".to_string());
            cmd.push(ranks.to_string());
        }
        cmd.push(build.binary_path.to_string_lossy().into_owned());
        cmd.push(PARAMETER_FILE.to_string());
        if let Some(suffix) = &command_line.options.cmd_suffix {
            cmd.push(suffix.clone());
        }
        cmd
    }

    /// Writes the parameter file, then runs the binary inside the run directory.
    ///
    /// # Returns
    /// The recorded outcome; a nonzero exit or a timeout yields
    /// `successful == false`.
    ///
    /// # Errors
    /// Only when the run cannot be started: the parameter file cannot be
    /// written or the program cannot be spawned.
    ///
    /// 写入参数文件，然后在运行目录中执行二进制文件。
    /// 仅当运行无法启动时返回错误。
    pub async fn execute(
        &mut self,
        build: &Build,
        command_line: &CommandLine,
        settings: &LaunchSettings,
    ) -> Result<RunOutcome> {
        combinations::write_combination(&self.parameters, &self.parameter_path)?;

        let cmd = self.command(build, command_line, &settings.mpi_launcher);
        let outcome = command::execute_cmd(&cmd, &self.target_directory, settings.timeout).await?;

        self.status.record(outcome.return_code);
        if outcome.timed_out {
            self.status.successful = false;
        }

        let output_path = self.target_directory.join(OUTPUT_FILE);
        if let Err(e) = fs::write(&output_path, &outcome.output) {
            eprintln!(
                "{}",
                t!("run.output_not_saved", path = output_path.display(), error = e).yellow()
            );
        }

        let run_outcome = RunOutcome {
            return_code: outcome.return_code,
            execution_time: outcome.duration,
            successful: self.status.successful,
            timed_out: outcome.timed_out,
            output: outcome.output,
        };
        self.outcome = Some(run_outcome.clone());
        Ok(run_outcome)
    }
}

/// Expands the run declaration below one command line.
///
/// # Errors
/// A missing or malformed declaration, or a failure to set up a run directory.
///
/// 在一个命令行下展开运行声明。
pub fn get_runs(tree: &mut StageTree, path: &Path, command_line: &CommandLine) -> Result<Vec<Run>> {
    if !path.is_file() {
        anyhow::bail!("Missing run declaration: {}", path.display());
    }
    combinations::get_combinations(path)?
        .into_iter()
        .map(|parameters| Run::new(tree, parameters, path, command_line))
        .collect()
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("RUN parameters:\n{}", self.parameters);
        f.write_str(&indent(&s, self.depth))
    }
}
