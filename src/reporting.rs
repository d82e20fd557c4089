//! # Reporting Module / 报告模块
//!
//! This module presents a finished matrix walk: a colored, localized console
//! summary with failure details, a JSON dump of the report tree and a static
//! HTML page.
//!
//! 此模块展示已完成的矩阵遍历：带颜色和本地化的控制台摘要及失败详情、
//! 报告树的 JSON 导出以及静态 HTML 页面。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_failure_details, print_summary};
pub use html::generate_html_report;
pub use json::write_json_report;
