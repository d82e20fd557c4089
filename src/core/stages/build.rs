//! # Build Stage / 构建阶段
//!
//! One build per configuration combination. A build owns the configure
//! command line derived from its configuration, knows where its binary will
//! appear, and compiles at most once. A binary is reused only when the
//! completion marker written after a successful configure and compile sits
//! next to it; a binary left by a failed or interrupted `make` is rebuilt.
//!
//! 每个配置组合对应一个构建。构建拥有由其配置派生的配置命令行，
//! 知道其二进制文件的位置，并且最多编译一次。只有当成功配置和编译后写入的
//! 完成标记存在时，二进制文件才会被复用；失败或中断的 `make` 留下的二进制文件会被重新构建。

use anyhow::Result;
use colored::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::core::combinations;
use crate::core::config::BuildSettings;
use crate::core::models::{BuildFailed, BuildPhase, BuildState, StageStatus};
use crate::core::params::ParameterMapping;
use crate::core::tree::{NodeId, StageKind, StageTree};
use crate::infra::command::{self, display_command};
use crate::infra::t;

/// Reserved configuration key naming the binary a build produces.
/// 保留的配置键，指定构建产生的二进制文件名。
pub const BINARY_KEY: &str = "binary";

/// Placeholder binary name used when a configuration lacks `binary`.
pub const NO_BINARY_SUPPLIED: &str = "no binary supplied";

/// Written into the build directory once configure and compile both succeeded.
/// 配置和编译都成功后写入构建目录的标记文件。
pub const BUILD_MARKER: &str = ".reggie_build_ok";

#[derive(Debug, Clone)]
pub struct Build {
    pub id: NodeId,
    pub index: usize,
    pub target_directory: PathBuf,
    pub base_directory: PathBuf,
    /// The configuration without the reserved `binary` entry.
    /// 去掉保留的 `binary` 条目后的配置。
    pub configuration: ParameterMapping,
    pub binary: Option<String>,
    /// Absolute path of the binary, fixed at construction.
    /// 二进制文件的绝对路径，在构造时确定。
    pub binary_path: PathBuf,
    pub cmake_cmd: Vec<String>,
    pub make_program: String,
    pub status: StageStatus,
}

impl Build {
    /// Registers a new build in `tree` for one configuration combination.
    ///
    /// A missing `binary` key does not fail here; it is reported by
    /// [`Build::compile`] before any subprocess is started.
    ///
    /// 在 `tree` 中为一个配置组合注册新的构建。
    /// 缺少 `binary` 键不会在此失败；它会在启动任何子进程之前由 [`Build::compile`] 报告。
    pub fn new(
        tree: &mut StageTree,
        base_directory: &Path,
        mut configuration: ParameterMapping,
        settings: &BuildSettings,
    ) -> Result<Self> {
        let id = tree.add(None, StageKind::Build)?;
        let node = tree.node(id);
        let target_directory = node.target_directory.clone();

        let binary = configuration.remove(BINARY_KEY);
        let binary_path =
            target_directory.join(binary.as_deref().unwrap_or(NO_BINARY_SUPPLIED));

        let mut cmake_cmd = vec![settings.configure_program.clone()];
        cmake_cmd.extend(configuration.iter().map(|(k, v)| format!("-D{}={}", k, v)));
        cmake_cmd.push(base_directory.to_string_lossy().into_owned());

        Ok(Self {
            id,
            index: node.index,
            target_directory,
            base_directory: base_directory.to_path_buf(),
            configuration,
            binary,
            binary_path,
            cmake_cmd,
            make_program: settings.make_program.clone(),
            status: StageStatus::default(),
        })
    }

    /// The compile command: `make -j [N]`, with `N` omitted when `jobs` is 0.
    /// 编译命令：`make -j [N]`，当 `jobs` 为 0 时省略 `N`。
    pub fn make_cmd(&self, jobs: usize) -> Vec<String> {
        let mut cmd = vec![self.make_program.clone(), "-j".to_string()];
        if jobs > 0 {
            cmd.push(jobs.to_string());
        }
        cmd
    }

    /// Path of the completion marker inside the build directory.
    pub fn marker_path(&self) -> PathBuf {
        self.target_directory.join(BUILD_MARKER)
    }

    /// Produces the binary unless a completed earlier build left it behind.
    ///
    /// # Arguments
    /// * `jobs` - Parallelism passed to the compile step
    /// * `timeout` - Optional limit for each of the two steps
    ///
    /// # Errors
    /// [`BuildFailed`] if the configuration has no binary, or if the configure
    /// or compile step exits nonzero (or cannot be started).
    ///
    /// 除非之前完成的构建留下了二进制文件，否则生成它。
    pub async fn compile(
        &mut self,
        jobs: usize,
        timeout: Option<Duration>,
    ) -> Result<BuildState, BuildFailed> {
        if self.binary.is_none() {
            self.status.successful = false;
            return Err(self.failure(BuildPhase::MissingBinary, None, String::new()));
        }

        let marker = self.marker_path();
        if self.binary_path.is_file() && marker.is_file() {
            println!(
                "{}",
                t!("build.cached", path = self.binary_path.display()).dimmed()
            );
            return Ok(BuildState::Cached);
        }

        let start = Instant::now();
        if let Err(e) = fs::create_dir_all(&self.target_directory) {
            self.status.successful = false;
            return Err(self.failure(BuildPhase::Configure, None, e.to_string()));
        }
        if let Err(e) = remove_marker(&marker) {
            self.status.successful = false;
            return Err(self.failure(BuildPhase::Configure, None, e.to_string()));
        }

        println!(
            "{}",
            t!("build.configuring", command = display_command(&self.cmake_cmd)).blue()
        );
        let cmake_cmd = self.cmake_cmd.clone();
        self.step(&cmake_cmd, BuildPhase::Configure, timeout).await?;

        let make_cmd = self.make_cmd(jobs);
        println!(
            "{}",
            t!("build.compiling", command = display_command(&make_cmd)).blue()
        );
        self.step(&make_cmd, BuildPhase::Compile, timeout).await?;

        if !self.binary_path.is_file() {
            self.status.successful = false;
            let message = format!(
                "compile step succeeded but did not produce {}",
                self.binary_path.display()
            );
            return Err(self.failure(BuildPhase::Compile, self.status.return_code, message));
        }

        if let Err(e) = fs::write(&marker, self.binary_path.to_string_lossy().as_bytes()) {
            self.status.successful = false;
            let message = format!("Failed to write build marker {}: {}", marker.display(), e);
            return Err(self.failure(BuildPhase::Compile, self.status.return_code, message));
        }

        let duration = start.elapsed();
        println!(
            "{}",
            t!("build.success", duration = format!("{:.2}", duration.as_secs_f64())).green()
        );
        Ok(BuildState::Compiled { duration })
    }

    async fn step(
        &mut self,
        argv: &[String],
        phase: BuildPhase,
        timeout: Option<Duration>,
    ) -> Result<(), BuildFailed> {
        let outcome = match command::execute_cmd(argv, &self.target_directory, timeout).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.status.successful = false;
                return Err(self.failure(phase, None, format!("{:#}", e)));
            }
        };

        self.status.record(outcome.return_code);
        if !outcome.success() {
            println!(
                "{}",
                t!("build.failed", phase = phase, path = self.target_directory.display()).red()
            );
            return Err(self.failure(phase, outcome.return_code, outcome.output));
        }
        Ok(())
    }

    fn failure(&self, phase: BuildPhase, return_code: Option<i32>, output: String) -> BuildFailed {
        BuildFailed {
            build: self.id,
            target_directory: self.target_directory.clone(),
            phase,
            return_code,
            output,
        }
    }
}

fn remove_marker(marker: &Path) -> std::io::Result<()> {
    match fs::remove_file(marker) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Creates one build per combination of the builds declaration file.
///
/// # Arguments
/// * `base_directory` - Source tree passed to the configure step
/// * `path` - The builds declaration (`builds.ini`)
///
/// 为构建声明文件的每个组合创建一个构建。
pub fn get_builds(
    tree: &mut StageTree,
    base_directory: &Path,
    path: &Path,
    settings: &BuildSettings,
) -> Result<Vec<Build>> {
    combinations::get_combinations(path)?
        .into_iter()
        .map(|configuration| Build::new(tree, base_directory, configuration, settings))
        .collect()
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BUILD in: {}", self.target_directory.display())?;
        write!(f, "{}", display_command(&self.cmake_cmd))
    }
}
