//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes a starter
//! `reggie.toml`, either from a built-in template or through an interactive
//! wizard.
//!
//! 此模块实现了 `init` 命令，通过内置模板或交互式向导写入初始的 `reggie.toml`。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::RegressionConfig;
use crate::infra::t;

/// Template written by `reggie init --non-interactive`.
pub const DEFAULT_CONFIG: &str = r#"# Regression matrix configuration / 回归矩阵配置

# Language for console output / 控制台输出语言
language = "en"

# Source tree passed to the configure step / 传给配置步骤的源码树
base_dir = "."
# Holds builds.ini and one directory per example / 包含 builds.ini 以及每个示例一个目录
check_dir = "checks"
# Root of the generated build_NNNN tree / 生成的 build_NNNN 树的根目录
output_dir = "reggie_outdir"

[build]
configure_program = "cmake"
make_program = "make"
# Parallel compile jobs; omit for the number of CPUs, 0 for a bare `-j`
# 并行编译任务数；省略则为 CPU 数量，0 表示不带数字的 `-j`
# jobs = 4

[run]
# Runs of one command line executed at the same time / 同一命令行下同时执行的运行数
jobs = 1
# Kill a run after this many seconds / 运行超过此秒数后将被终止
# timeout_secs = 600
mpi_launcher = "mpirun"

[files]
builds = "builds.ini"
exclude_build = "excludeBuild.ini"
command_line = "command_line.ini"
run = "run.ini"
analyze = "analyze.ini"
"#;

/// Writes a starter configuration to `config_path`.
///
/// In interactive mode the user is asked for the directories and limits and
/// confirms before an existing file is replaced. Non-interactive mode writes
/// [`DEFAULT_CONFIG`] and refuses to replace an existing file.
///
/// 将初始配置写入 `config_path`。
/// 交互模式下会询问用户目录和限制，并在替换现有文件前确认。
/// 非交互模式写入 [`DEFAULT_CONFIG`]，且拒绝替换现有文件。
pub fn run_init_wizard(language: &str, non_interactive: bool, config_path: &Path) -> Result<()> {
    if non_interactive {
        if config_path.exists() {
            anyhow::bail!(t!(
                "init.file_exists",
                locale = language,
                path = config_path.display()
            )
            .to_string());
        }
        return write_config(config_path, DEFAULT_CONFIG, language);
    }

    let theme = ColorfulTheme::default();
    println!("\n{}", t!("init.welcome", locale = language).cyan().bold());
    println!("{}", t!("init.description", locale = language));

    if config_path.exists() {
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!(
                "init.overwrite_prompt",
                locale = language,
                path = config_path.display()
            ))
            .default(false)
            .interact()
            .context(t!("init.user_confirmation_failed", locale = language).to_string())?;
        if !confirmation {
            println!("{}", t!("init.aborted", locale = language));
            return Ok(());
        }
    }

    let mut config = RegressionConfig {
        language: language.to_string(),
        ..RegressionConfig::default()
    };

    let check_dir: String = Input::with_theme(&theme)
        .with_prompt(t!("init.check_dir_prompt", locale = language))
        .default("checks".to_string())
        .interact_text()?;
    config.check_dir = Some(PathBuf::from(check_dir));

    let base_dir: String = Input::with_theme(&theme)
        .with_prompt(t!("init.base_dir_prompt", locale = language))
        .default(".".to_string())
        .interact_text()?;
    config.base_dir = PathBuf::from(base_dir);

    let output_dir: String = Input::with_theme(&theme)
        .with_prompt(t!("init.output_dir_prompt", locale = language))
        .default(config.output_dir.display().to_string())
        .interact_text()?;
    config.output_dir = PathBuf::from(output_dir);

    let build_jobs: String = Input::with_theme(&theme)
        .with_prompt(t!("init.build_jobs_prompt", locale = language))
        .allow_empty(true)
        .interact_text()?;
    config.build.jobs = parse_optional(&build_jobs, language)?;

    config.run.jobs = Input::with_theme(&theme)
        .with_prompt(t!("init.run_jobs_prompt", locale = language))
        .default(config.run.jobs)
        .interact_text()?;

    let timeout: String = Input::with_theme(&theme)
        .with_prompt(t!("init.timeout_prompt", locale = language))
        .allow_empty(true)
        .interact_text()?;
    config.run.timeout_secs = parse_optional(&timeout, language)?;

    let uses_mpi = Confirm::with_theme(&theme)
        .with_prompt(t!("init.mpi_prompt", locale = language))
        .default(true)
        .interact()?;
    if uses_mpi {
        config.run.mpi_launcher = Input::with_theme(&theme)
            .with_prompt(t!("init.mpi_launcher_prompt", locale = language))
            .default(config.run.mpi_launcher.clone())
            .interact_text()?;
    }

    let toml_string = toml::to_string_pretty(&config)
        .context(t!("init.serialize_failed", locale = language).to_string())?;
    write_config(config_path, &toml_string, language)
}

fn parse_optional<T: std::str::FromStr>(input: &str, language: &str) -> Result<Option<T>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    input
        .parse()
        .map(Some)
        .map_err(|_| anyhow::anyhow!(t!("init.invalid_number", locale = language, value = input).to_string()))
}

fn write_config(path: &Path, content: &str, language: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| t!("init.write_failed", locale = language, path = parent.display()).to_string())?;
    }
    fs::write(path, content)
        .with_context(|| t!("init.write_failed", locale = language, path = path.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success_created", locale = language, path = path.display()).bold()
    );
    println!("{}", t!("init.usage_hint", locale = language));

    Ok(())
}
