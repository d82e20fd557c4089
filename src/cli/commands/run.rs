//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which loads the configuration,
//! walks the regression matrix and reports the result.
//!
//! 此模块实现了 `run` 命令，加载配置、遍历回归矩阵并报告结果。

use anyhow::{Context, Result};
use colored::*;
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::{self, CONFIG_FILE_NAME, RegressionConfig},
        execution::{MatrixSettings, run_matrix},
    },
    infra::{resolve_locale, t},
    reporting::{generate_html_report, print_failure_details, print_summary, write_json_report},
};

/// Options of `reggie run`. Every `Some` overrides the configuration file.
/// `reggie run` 的选项。每个 `Some` 都会覆盖配置文件中的值。
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub check_dir: Option<PathBuf>,
    pub base_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub build_jobs: Option<usize>,
    pub jobs: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Language given on the command line; wins over the configuration.
    pub language: Option<String>,
}

/// Executes the run command with the provided options.
///
/// # Returns
/// `Ok` only if every build succeeded or was cached and every run passed.
///
/// 使用提供的选项执行运行命令。
/// 仅当每个构建都成功或被缓存且每个运行都通过时返回 `Ok`。
pub async fn execute(options: RunOptions) -> Result<()> {
    let (config, config_path) = load_configuration(&options)?;
    let config = apply_overrides(config, &options);

    let locale = options
        .language
        .clone()
        .unwrap_or_else(|| resolve_locale(&config.language));
    rust_i18n::set_locale(&locale);

    match &config_path {
        Some(path) => println!(
            "{}",
            t!("run.config_loaded", locale = &locale, path = path.display())
        ),
        None => println!("{}", t!("run.config_defaults", locale = &locale).dimmed()),
    }

    let settings = MatrixSettings::from_config(&config)?;
    println!(
        "{}",
        t!("run.check_dir", locale = &locale, path = settings.check_dir.display()).cyan()
    );

    let stop_token = setup_signal_handler(&locale);
    let report = run_matrix(&settings, stop_token).await?;

    print_summary(&report, &locale);

    if let Some(json_path) = &options.json {
        println!("\n{}", t!("run.writing_json", locale = &locale, path = json_path.display()));
        if let Err(e) = write_json_report(&report, json_path) {
            eprintln!("{} {:#}", t!("run.report_failed", locale = &locale).red(), e);
        }
    }

    if let Some(html_path) = &options.html {
        println!("\n{}", t!("run.writing_html", locale = &locale, path = html_path.display()));
        if let Err(e) = generate_html_report(&report, html_path, &locale) {
            eprintln!("{} {:#}", t!("run.report_failed", locale = &locale).red(), e);
        }
    }

    if report.has_failures() {
        print_failure_details(&report, &locale);
        anyhow::bail!(t!("run.matrix_failed", locale = &locale).to_string());
    }

    println!("\n{}", t!("run.all_passed", locale = &locale).green().bold());
    Ok(())
}

/// Loads the configuration named by `--config`, or `reggie.toml` in the
/// current directory if it exists, or the built-in defaults.
///
/// 加载 `--config` 指定的配置；若未指定则加载当前目录中存在的 `reggie.toml`，否则使用内置默认值。
fn load_configuration(options: &RunOptions) -> Result<(RegressionConfig, Option<PathBuf>)> {
    let path = match &options.config {
        Some(path) => path.clone(),
        None => {
            let default_path = Path::new(CONFIG_FILE_NAME);
            if !default_path.is_file() {
                return Ok((RegressionConfig::default(), None));
            }
            default_path.to_path_buf()
        }
    };

    let path = std::fs::canonicalize(&path)
        .with_context(|| format!("Failed to find config file: {}", path.display()))?;
    let config = config::load_config(&path)?;
    Ok((config, Some(path)))
}

fn apply_overrides(mut config: RegressionConfig, options: &RunOptions) -> RegressionConfig {
    if let Some(check_dir) = &options.check_dir {
        config.check_dir = Some(check_dir.clone());
    }
    if let Some(base_dir) = &options.base_dir {
        config.base_dir = base_dir.clone();
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(jobs) = options.build_jobs {
        config.build.jobs = Some(jobs);
    }
    if let Some(jobs) = options.jobs {
        config.run.jobs = jobs;
    }
    if let Some(timeout) = options.timeout_secs {
        config.run.timeout_secs = Some(timeout);
    }
    config
}

/// Sets up a signal handler for graceful shutdown.
fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("run.shutdown_signal", locale = &locale).yellow());
            token_clone.cancel();
        }
    });

    token
}
