//! # Combination Provider Module / 参数组合模块
//!
//! Turns a parameter-declaration file into the ordered sequence of concrete
//! parameter mappings it describes, and writes a single mapping back out as a
//! parameter file that parses to the same mapping.
//!
//! 将参数声明文件转换为其描述的有序具体参数映射序列，
//! 并将单个映射写回为一个可解析为相同映射的参数文件。
//!
//! ## File Format / 文件格式
//!
//! ```text
//! ! comment
//! # comment
//! N        = 1, 2, 4
//! Rotation = (/1.,0.,0./)      ! commas inside brackets do not split
//! ```
//!
//! Each declaration line holds one key and a comma separated value list. The
//! expansion is the Cartesian product of all value lists: keys keep their
//! declaration order and the last declared key varies fastest.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use crate::core::params::ParameterMapping;

/// A single `key = v1, v2, ...` line of a declaration file.
/// 声明文件中的单行 `key = v1, v2, ...`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub key: String,
    pub values: Vec<String>,
}

/// Reads a declaration file and expands it into all of its combinations.
///
/// # Arguments
/// * `path` - Path to the declaration file (e.g. `builds.ini`, `run.ini`)
///
/// # Returns
/// The combinations in deterministic product order. A file without any
/// declaration yields an empty sequence.
///
/// 读取声明文件并将其展开为所有组合。
pub fn get_combinations(path: &Path) -> Result<Vec<ParameterMapping>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read declaration file: {}", path.display()))?;
    let declarations = parse_declarations(&content)
        .with_context(|| format!("Failed to parse declaration file: {}", path.display()))?;
    Ok(expand(&declarations))
}

/// Parses declaration text into its key/value-list lines.
/// 将声明文本解析为键/值列表行。
pub fn parse_declarations(content: &str) -> Result<Vec<Declaration>> {
    let mut declarations: Vec<Declaration> = Vec::new();

    for (line_no, raw) in content.lines().enumerate() {
        let line_no = line_no + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, values)) = line.split_once('=') else {
            bail!("line {}: expected `key = value[, value...]`, found `{}`", line_no, raw.trim());
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("line {}: missing parameter name before `=`", line_no);
        }
        if declarations.iter().any(|d| d.key == key) {
            bail!("line {}: parameter `{}` is declared more than once", line_no, key);
        }

        let values = split_top_level(values);
        if values.iter().any(|v| v.is_empty()) {
            bail!("line {}: parameter `{}` has an empty value", line_no, key);
        }

        declarations.push(Declaration {
            key: key.to_string(),
            values,
        });
    }

    Ok(declarations)
}

/// Expands declarations into the Cartesian product of their value lists.
///
/// Odometer order: the last declaration cycles fastest. No declarations means
/// nothing was declared, so the result is empty rather than one empty mapping.
///
/// 将声明展开为其值列表的笛卡尔积。里程表顺序：最后一个声明变化最快。
pub fn expand(declarations: &[Declaration]) -> Vec<ParameterMapping> {
    if declarations.is_empty() || declarations.iter().any(|d| d.values.is_empty()) {
        return Vec::new();
    }

    let total: usize = declarations.iter().map(|d| d.values.len()).product();
    let mut combinations = Vec::with_capacity(total);
    let mut cursor = vec![0usize; declarations.len()];

    loop {
        combinations.push(
            declarations
                .iter()
                .zip(&cursor)
                .map(|(d, &i)| (d.key.clone(), d.values[i].clone()))
                .collect(),
        );

        // advance the odometer from the right
        let mut pos = declarations.len();
        loop {
            if pos == 0 {
                return combinations;
            }
            pos -= 1;
            cursor[pos] += 1;
            if cursor[pos] < declarations[pos].values.len() {
                break;
            }
            cursor[pos] = 0;
        }
    }
}

/// Returns `true` if any mapping in `candidates` is a subset of `configuration`.
/// An empty candidate list matches nothing.
///
/// 如果 `candidates` 中的任意映射是 `configuration` 的子集，则返回 `true`。
pub fn any_is_subset(candidates: &[ParameterMapping], configuration: &ParameterMapping) -> bool {
    candidates.iter().any(|c| c.is_subset_of(configuration))
}

/// Writes one mapping as a parameter file (`key = value` per line).
///
/// Rejects mappings that would not parse back to themselves, so that
/// `get_combinations(path) == [mapping]` always holds after a successful write.
///
/// 将一个映射写为参数文件（每行 `key = value`）。
/// 拒绝无法解析回自身的映射。
pub fn write_combination(mapping: &ParameterMapping, path: &Path) -> Result<()> {
    let rendered = render_combination(mapping)?;
    fs::write(path, rendered)
        .with_context(|| format!("Failed to write parameter file: {}", path.display()))
}

/// Renders the parameter-file text for one mapping.
pub fn render_combination(mapping: &ParameterMapping) -> Result<String> {
    let mut out = String::new();
    for (key, value) in mapping.iter() {
        check_representable(key, value)?;
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(value);
        out.push('\n');
    }
    Ok(out)
}

fn check_representable(key: &str, value: &str) -> Result<()> {
    let key_ok = !key.is_empty()
        && key.trim() == key
        && !key.contains(['=', '!', '\n', '\r'])
        && !key.starts_with('#');
    if !key_ok {
        bail!("parameter name `{}` cannot be written to a parameter file", key);
    }
    let value_ok = !value.is_empty()
        && value.trim() == value
        && !value.contains(['!', '\n', '\r'])
        && split_top_level(value).len() == 1;
    if !value_ok {
        bail!("value `{}` of parameter `{}` cannot be written to a parameter file", value, key);
    }
    Ok(())
}

/// Drops `#` comment lines and anything after a `!`.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find('!') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Splits at commas that are not enclosed in `()`, `[]` or `{}` and trims each part.
fn split_top_level(values: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut current = String::new();

    for c in values.chars() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    parts.push(current.trim().to_string());
    parts
}
