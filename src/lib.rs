//! # Reggie Library / Reggie 库
//!
//! This library provides the core functionality of reggie, a regression-test
//! matrix executor for compiled simulation codes. Every build configuration is
//! compiled once, every compatible example is run under every command-line and
//! run-parameter combination, and the outcome of each run is recorded.
//!
//! 此库为 reggie 提供核心功能，这是一个面向编译型模拟程序的回归测试矩阵执行器。
//! 每个构建配置只编译一次，每个兼容的示例都在每个命令行和运行参数组合下运行，
//! 并记录每次运行的结果。
//!
//! ## Modules / 模块
//!
//! - `core` - Parameter combinations, the stage tree, the stages and the matrix walk
//! - `infra` - Infrastructure services like command execution and file system operations
//! - `reporting` - Console, JSON and HTML reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 参数组合、阶段树、各阶段以及矩阵遍历
//! - `infra` - 基础设施服务，如命令执行和文件系统操作
//! - `reporting` - 控制台、JSON 和 HTML 报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::execution;
pub use core::models;

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale, sets the closest
/// language the application ships (falling back to English) and returns it.
///
/// 根据系统语言环境初始化国际化，设置最接近的可用语言并返回它。
pub fn init() -> String {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let locale = infra::resolve_locale(&locale);
    rust_i18n::set_locale(&locale);
    locale
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
