//! # Configuration Module / 配置模块
//!
//! This module handles loading and parsing of the regression configuration
//! file (`reggie.toml`). It names the source tree, the check directory holding
//! the declaration files, the output directory and the tools used to build and
//! run.
//!
//! 此模块处理回归配置文件（`reggie.toml`）的加载和解析。
//! 它指定源码树、包含声明文件的检查目录、输出目录以及用于构建和运行的工具。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default file name of the configuration.
/// 配置文件的默认名称。
pub const CONFIG_FILE_NAME: &str = "reggie.toml";

/// The complete regression configuration, loaded from a TOML file.
/// 从 TOML 文件加载的完整回归配置。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegressionConfig {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,

    /// Source tree handed to the configure step as its last argument.
    /// 作为配置步骤最后一个参数传入的源码树。
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Directory containing the builds declaration and one subdirectory per example.
    /// 包含构建声明文件以及每个示例一个子目录的目录。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_dir: Option<PathBuf>,

    /// Root of the generated `build_NNNN/...` tree.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub build: BuildSettings,

    #[serde(default)]
    pub run: RunSettings,

    #[serde(default)]
    pub files: DeclarationFiles,
}

/// Tools and parallelism used to compile each configuration.
/// 用于编译每个配置的工具和并行度。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildSettings {
    #[serde(default = "default_configure_program")]
    pub configure_program: String,
    #[serde(default = "default_make_program")]
    pub make_program: String,
    /// `make -j N`. Unset means the number of CPUs, `0` means a bare `-j`.
    /// `make -j N`。未设置表示 CPU 数量，`0` 表示不带数字的 `-j`。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            configure_program: default_configure_program(),
            make_program: default_make_program(),
            jobs: None,
        }
    }
}

impl BuildSettings {
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get)
    }
}

/// How runs are launched.
/// 运行的启动方式。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunSettings {
    /// Runs of one command line executed concurrently. `1` runs them one by one.
    /// 同一命令行下并发执行的运行数。`1` 表示逐个运行。
    #[serde(default = "default_run_jobs")]
    pub jobs: usize,
    /// Kill a run after this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_mpi_launcher")]
    pub mpi_launcher: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            jobs: default_run_jobs(),
            timeout_secs: None,
            mpi_launcher: default_mpi_launcher(),
        }
    }
}

impl RunSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Names of the declaration files looked up in the check and example directories.
/// 在检查目录和示例目录中查找的声明文件名。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeclarationFiles {
    #[serde(default = "default_builds_file")]
    pub builds: String,
    #[serde(default = "default_exclude_file")]
    pub exclude_build: String,
    #[serde(default = "default_command_line_file")]
    pub command_line: String,
    #[serde(default = "default_run_file")]
    pub run: String,
    #[serde(default = "default_analyze_file")]
    pub analyze: String,
}

impl Default for DeclarationFiles {
    fn default() -> Self {
        Self {
            builds: default_builds_file(),
            exclude_build: default_exclude_file(),
            command_line: default_command_line_file(),
            run: default_run_file(),
            analyze: default_analyze_file(),
        }
    }
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            base_dir: default_base_dir(),
            check_dir: None,
            output_dir: default_output_dir(),
            build: BuildSettings::default(),
            run: RunSettings::default(),
            files: DeclarationFiles::default(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reggie_outdir")
}

fn default_configure_program() -> String {
    "cmake".to_string()
}

fn default_make_program() -> String {
    "make".to_string()
}

fn default_run_jobs() -> usize {
    1
}

fn default_mpi_launcher() -> String {
    "mpirun".to_string()
}

fn default_builds_file() -> String {
    "builds.ini".to_string()
}

fn default_exclude_file() -> String {
    "excludeBuild.ini".to_string()
}

fn default_command_line_file() -> String {
    "command_line.ini".to_string()
}

fn default_run_file() -> String {
    "run.ini".to_string()
}

fn default_analyze_file() -> String {
    "analyze.ini".to_string()
}

/// Loads a configuration file. Paths inside it are expanded (`~`, `$VAR`) and
/// resolved relative to the directory containing the file.
///
/// # Arguments
/// * `path` - Path to the TOML configuration file
///
/// 加载配置文件。其中的路径会被展开（`~`、`$VAR`），
/// 并相对于包含该文件的目录进行解析。
pub fn load_config(path: &Path) -> Result<RegressionConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let mut config: RegressionConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    let anchor = path.parent().unwrap_or_else(|| Path::new("."));
    config.base_dir = resolve_path(anchor, &config.base_dir)?;
    config.output_dir = resolve_path(anchor, &config.output_dir)?;
    if let Some(check_dir) = &config.check_dir {
        config.check_dir = Some(resolve_path(anchor, check_dir)?);
    }
    Ok(config)
}

/// Expands `~` and environment variables in `path` and joins a relative
/// result onto `anchor`.
pub fn resolve_path(anchor: &Path, path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand path: {}", raw))?;
    let expanded = PathBuf::from(expanded.as_ref());
    Ok(if expanded.is_absolute() {
        expanded
    } else {
        anchor.join(expanded)
    })
}
