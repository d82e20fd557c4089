//! # Config Module Unit Tests / Config 模块单元测试
//!
//! Tests for loading `reggie.toml`: defaults, path resolution and the
//! starter configuration written by `reggie init`.
//!
//! 测试 `reggie.toml` 的加载：默认值、路径解析以及 `reggie init` 写入的初始配置。

use reggie::cli::commands::init::DEFAULT_CONFIG;
use reggie::core::config::{RegressionConfig, load_config, resolve_path};
use reggie::core::execution::MatrixSettings;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

#[cfg(test)]
mod defaults_tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: RegressionConfig = toml::from_str("").unwrap();
        assert_eq!(config.language, "en");
        assert_eq!(config.check_dir, None);
        assert_eq!(config.build.configure_program, "cmake");
        assert_eq!(config.build.make_program, "make");
        assert_eq!(config.build.jobs, None);
        assert_eq!(config.run.jobs, 1);
        assert_eq!(config.run.timeout(), None);
        assert_eq!(config.run.mpi_launcher, "mpirun");
        assert_eq!(config.files.builds, "builds.ini");
        assert_eq!(config.files.exclude_build, "excludeBuild.ini");
        assert_eq!(config.files.command_line, "command_line.ini");
        assert_eq!(config.files.run, "run.ini");
        assert_eq!(config.files.analyze, "analyze.ini");
    }

    #[test]
    fn test_build_jobs_fall_back_to_cpu_count() {
        let config = RegressionConfig::default();
        assert_eq!(config.build.effective_jobs(), num_cpus::get());

        let config: RegressionConfig = toml::from_str("[build]\njobs = 0\n").unwrap();
        assert_eq!(config.build.effective_jobs(), 0);
    }

    #[test]
    fn test_timeout_is_converted_to_duration() {
        let config: RegressionConfig = toml::from_str("[run]\ntimeout_secs = 30\n").unwrap();
        assert_eq!(config.run.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_unset_options_are_not_serialized() {
        let text = toml::to_string(&RegressionConfig::default()).unwrap();
        assert!(!text.contains("check_dir"));
        assert!(!text.contains("timeout_secs"));
        let back: RegressionConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.output_dir, RegressionConfig::default().output_dir);
    }

    #[test]
    fn test_default_template_parses() {
        let config: RegressionConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.check_dir.as_deref(), Some(Path::new("checks")));
        assert_eq!(config.run.jobs, 1);
        assert_eq!(config.files.run, "run.ini");
    }
}

#[cfg(test)]
mod loading_tests {
    use super::*;

    #[test]
    fn test_relative_paths_resolve_against_config_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reggie.toml");
        fs::write(&path, "base_dir = \"..\"\ncheck_dir = \"checks/run_basic\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.base_dir, dir.path().join(".."));
        assert_eq!(config.check_dir, Some(dir.path().join("checks/run_basic")));
        assert_eq!(config.output_dir, dir.path().join("reggie_outdir"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reggie.toml");
        fs::write(&path, "check_dir = \"/opt/checks\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.check_dir.as_deref(), Some(Path::new("/opt/checks")));
    }

    #[test]
    fn test_environment_variables_are_expanded() {
        let anchor = Path::new("/anchor");
        let home = std::env::var("HOME").unwrap_or_default();
        if home.is_empty() {
            return;
        }
        let resolved = resolve_path(anchor, Path::new("$HOME/checks")).unwrap();
        assert_eq!(resolved, Path::new(&home).join("checks"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reggie.toml");
        fs::write(&path, "[run\njobs = 1\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_matrix_settings_require_check_dir() {
        let config = RegressionConfig::default();
        let err = MatrixSettings::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("check directory"));

        let config = RegressionConfig {
            check_dir: Some("checks".into()),
            ..RegressionConfig::default()
        };
        let settings = MatrixSettings::from_config(&config).unwrap();
        assert_eq!(settings.check_dir, Path::new("checks"));
    }
}
