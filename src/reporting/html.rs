//! # HTML Reporting Module / HTML 报告模块
//!
//! Renders a static, self-contained HTML page for one matrix walk: summary
//! counters, one section per build and a table of runs per example with the
//! captured output of failures folded away.
//!
//! 为一次矩阵遍历渲染静态、自包含的 HTML 页面：摘要计数、
//! 每个构建一个部分，以及每个示例的运行表格，失败的捕获输出默认折叠。

use anyhow::{Context, Result};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;

use crate::core::models::{BuildReport, BuildStatus, ExampleReport, MatrixReport};
use crate::infra::fmt::seconds;
use crate::infra::t;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2em; color: #24292e; }
h1 { border-bottom: 1px solid #e1e4e8; padding-bottom: .3em; }
.meta { color: #586069; }
.summary-container { display: flex; gap: 1.5em; margin: 1.5em 0; }
.summary-item { border: 1px solid #e1e4e8; border-radius: 6px; padding: .8em 1.2em; text-align: center; }
.summary-item .count { display: block; font-size: 1.8em; font-weight: 600; }
.summary-item .label { color: #586069; }
.passed-text { color: #22863a; }
.failed-text { color: #cb2431; }
.skipped-text { color: #6a737d; }
section.build { border: 1px solid #e1e4e8; border-radius: 6px; margin: 1em 0; padding: 0 1em 1em; }
code.cmd { display: block; background: #f6f8fa; padding: .5em; overflow-x: auto; }
table { border-collapse: collapse; width: 100%; margin-top: .5em; }
th, td { border-bottom: 1px solid #e1e4e8; padding: .4em .6em; text-align: left; vertical-align: top; }
.status-cell { display: inline-block; border-radius: 4px; padding: 0 .5em; color: #fff; }
.status-passed { background: #28a745; }
.status-failed { background: #d73a49; }
.status-timeout { background: #e36209; }
.status-skipped { background: #6a737d; }
pre.output-content { background: #f6f8fa; padding: .5em; max-height: 30em; overflow: auto; }
"#;

/// Generates the HTML report for `report` at `output_path`.
///
/// # Arguments / 参数
/// * `report` - The finished walk / 已完成的遍历
/// * `output_path` - Where the page is written / 页面写入位置
/// * `locale` - The locale used for labels / 标签使用的语言环境
///
/// # Errors / 错误
/// The file or its parent directory cannot be written.
/// 无法写入文件或其父目录。
pub fn generate_html_report(report: &MatrixReport, output_path: &Path, locale: &str) -> Result<()> {
    let page = render(report, locale);
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(output_path, page.into_string())
        .with_context(|| format!("Failed to write HTML report: {}", output_path.display()))
}

/// Renders the complete page.
/// 渲染完整页面。
pub fn render(report: &MatrixReport, locale: &str) -> Markup {
    let totals = report.totals();
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", locale = locale)) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header", locale = locale)) }
                p.meta {
                    (report.started_at.format("%Y-%m-%d %H:%M:%S").to_string())
                    " · "
                    (report.output_directory.display().to_string())
                    @if report.cancelled {
                        " · " span.failed-text { (t!("html_report.cancelled", locale = locale)) }
                    }
                }
                div.summary-container {
                    (summary_item(totals.builds, "", &t!("html_report.summary.builds", locale = locale)))
                    (summary_item(totals.builds_failed, "failed-text", &t!("html_report.summary.builds_failed", locale = locale)))
                    (summary_item(totals.runs, "", &t!("html_report.summary.runs", locale = locale)))
                    (summary_item(totals.runs_passed, "passed-text", &t!("html_report.summary.passed", locale = locale)))
                    (summary_item(totals.runs_failed, "failed-text", &t!("html_report.summary.failed", locale = locale)))
                    (summary_item(totals.runs_skipped, "skipped-text", &t!("html_report.summary.skipped", locale = locale)))
                }
                @for build in &report.builds {
                    (build_section(build, locale))
                }
            }
        }
    }
}

fn summary_item(count: usize, class: &str, label: &str) -> Markup {
    html! {
        div.summary-item {
            span class={ "count " (class) } { (count) }
            span.label { (label) }
        }
    }
}

fn build_section(build: &BuildReport, locale: &str) -> Markup {
    let status_class = match &build.status {
        BuildStatus::Compiled { .. } | BuildStatus::Cached => "passed-text",
        BuildStatus::Failed { .. } => "failed-text",
        BuildStatus::Skipped => "skipped-text",
    };
    html! {
        section.build {
            h2 {
                (build.directory.display().to_string())
                " "
                span class=(status_class) { (build.status.get_status_str(locale)) }
                @if let BuildStatus::Compiled { duration_secs } = &build.status {
                    " " small.meta { (seconds(*duration_secs)) }
                }
            }
            p { (build.configuration.to_string()) }
            code.cmd { (build.cmake_cmd.join(" ")) }
            @if let BuildStatus::Failed { phase, output, .. } = &build.status {
                details open {
                    summary { (t!("report.build_log", locale = locale)) " (" (phase.to_string()) ")" }
                    pre.output-content { (output) }
                }
            }
            @for example in &build.examples {
                (example_table(example, locale))
            }
        }
    }
}

fn example_table(example: &ExampleReport, locale: &str) -> Markup {
    html! {
        h3 { (example.name) " " small.meta { (example.directory.display().to_string()) } }
        @if let Some(error) = &example.analysis_error {
            p.failed-text { (t!("html_report.analysis_disabled", locale = locale)) ": " (error) }
        }
        @if !example.analyzes.is_empty() {
            p.meta {
                (t!("html_report.analyzes", locale = locale)) ": "
                @for (i, analyze) in example.analyzes.iter().enumerate() {
                    @if i > 0 { "; " }
                    (analyze.parameters.to_string())
                }
            }
        }
        table {
            thead {
                tr {
                    th { (t!("html_report.table.header.run", locale = locale)) }
                    th { (t!("html_report.table.header.parameters", locale = locale)) }
                    th { (t!("html_report.table.header.status", locale = locale)) }
                    th { (t!("html_report.table.header.duration", locale = locale)) }
                }
            }
            tbody {
                @for command_line in &example.command_lines {
                    @for run in &command_line.runs {
                        tr {
                            td { (run.directory.display().to_string()) }
                            td {
                                (command_line.parameters.to_string())
                                @if !command_line.parameters.is_empty() && !run.parameters.is_empty() { " | " }
                                (run.parameters.to_string())
                            }
                            td {
                                div class={ "status-cell " (run.status.get_status_class()) } {
                                    (run.status.get_status_str(locale))
                                }
                                @if run.status.is_failure() {
                                    details {
                                        summary { (t!("html_report.toggle_output", locale = locale)) }
                                        pre.output-content { "$ " (run.command.join(" ")) "\n" (run.output) }
                                    }
                                }
                            }
                            td { (seconds(run.execution_time_secs)) }
                        }
                    }
                }
            }
        }
    }
}
