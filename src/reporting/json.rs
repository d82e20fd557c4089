//! # JSON Reporting Module / JSON 报告模块
//!
//! Writes the whole report tree as pretty-printed JSON for later tooling.
//!
//! 将整个报告树写为格式化的 JSON，供后续工具使用。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::MatrixReport;

/// Serializes `report` to `output_path`, creating parent directories as needed.
/// 将 `report` 序列化到 `output_path`，必要时创建父目录。
pub fn write_json_report(report: &MatrixReport, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report: {}", output_path.display()))
}
