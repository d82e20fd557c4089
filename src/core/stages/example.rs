//! # Example Stage / 示例阶段

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::combinations;
use crate::core::stages::Build;
use crate::core::tree::{NodeId, StageKind, StageTree};
use crate::infra::fmt::indent;
use crate::infra::fs::sorted_subdirectories;

/// One example directory paired with one build.
/// 与一个构建配对的一个示例目录。
#[derive(Debug, Clone)]
pub struct Example {
    pub id: NodeId,
    pub index: usize,
    /// Basename of the source directory.
    pub name: String,
    /// Directory holding the example's input and declaration files. Read only.
    /// 保存示例输入文件和声明文件的目录。只读。
    pub source_directory: PathBuf,
    pub target_directory: PathBuf,
    /// Depth in the stage tree, used to indent listings.
    pub depth: usize,
}

impl Example {
    pub fn new(tree: &mut StageTree, source_directory: &Path, build: &Build) -> Result<Self> {
        let id = tree.add(Some(build.id), StageKind::Example)?;
        let node = tree.node(id);
        Ok(Self {
            id,
            index: node.index,
            name: source_directory
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            source_directory: source_directory.to_path_buf(),
            target_directory: node.target_directory.clone(),
            depth: tree.depth(id),
        })
    }

    /// Path of a declaration file inside the example's source directory.
    pub fn declaration(&self, file_name: &str) -> PathBuf {
        self.source_directory.join(file_name)
    }
}

/// Returns `true` if the example at `example_dir` must be skipped for `build`.
///
/// The example is excluded iff it has an exclusion file and at least one of
/// the mappings declared there is a subset of the build's configuration.
///
/// # Errors
/// An unreadable or malformed exclusion file is an error, never "no exclusions".
///
/// 如果位于 `example_dir` 的示例必须为 `build` 跳过，则返回 `true`。
/// 不可读或格式错误的排除文件是错误，而不是“无排除”。
pub fn is_excluded(example_dir: &Path, exclude_file_name: &str, build: &Build) -> Result<bool> {
    let exclude_path = example_dir.join(exclude_file_name);
    if !exclude_path.exists() {
        return Ok(false);
    }
    let excludes = combinations::get_combinations(&exclude_path)
        .with_context(|| format!("Invalid exclusion file: {}", exclude_path.display()))?;
    Ok(combinations::any_is_subset(&excludes, &build.configuration))
}

/// Lists the examples below `check_dir` that are compatible with `build`.
///
/// Subdirectories are visited in sorted name order; plain files are ignored.
/// Exclusion is decided before a node is created, so excluded examples never
/// consume an index or a directory.
///
/// 列出 `check_dir` 下与 `build` 兼容的示例。
/// 子目录按名称排序访问；普通文件被忽略。
pub fn get_examples(
    tree: &mut StageTree,
    check_dir: &Path,
    build: &Build,
    exclude_file_name: &str,
) -> Result<Vec<Example>> {
    let mut examples = Vec::new();
    for dir in sorted_subdirectories(check_dir)? {
        if is_excluded(&dir, exclude_file_name, build)? {
            continue;
        }
        examples.push(Example::new(tree, &dir, build)?);
    }
    Ok(examples)
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("EXAMPLE in: {}", self.source_directory.display());
        f.write_str(&indent(&s, self.depth))
    }
}
