//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for reggie,
//! including command execution, file system operations and text layout.
//!
//! 此模块为 reggie 提供基础设施服务，
//! 包括命令执行、文件系统操作和文本布局。

pub mod command;
pub mod fmt;
pub mod fs;

// Re-export i18n functions for easier access
pub use rust_i18n::t;

/// Maps a requested locale onto one the application ships.
///
/// Tries the full locale first (e.g. "zh-CN"), then the language part alone
/// (e.g. "en" from "en-US"), and finally falls back to "en".
///
/// 将请求的语言环境映射到应用程序提供的语言环境之一。
pub fn resolve_locale(requested: &str) -> String {
    let available_locales = rust_i18n::available_locales!();
    let requested = requested.replace('_', "-");

    if available_locales.contains(&requested.as_str()) {
        return requested;
    }
    requested
        .split('-')
        .next()
        .and_then(|lang_code| {
            available_locales
                .iter()
                .find(|locale| locale.split('-').next() == Some(lang_code))
        })
        .map_or_else(|| "en".to_string(), |locale| locale.to_string())
}
