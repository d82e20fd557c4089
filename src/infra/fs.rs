//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides utilities for file system operations used while
//! walking the matrix: resetting run directories, copying example inputs
//! into them, listing example directories and resolving paths.
//!
//! 此模块提供遍历矩阵时使用的文件系统操作工具：
//! 重置运行目录、将示例输入复制到其中、列出示例目录以及解析路径。

use anyhow::{Context, Result};
use fs_extra::dir::{CopyOptions, copy, create};
use std::fs;
use std::path::{Path, PathBuf};

/// Copies every entry of `from` into the existing directory `to`.
/// Files are copied directly, subdirectories recursively. Existing files in
/// `to` are overwritten.
///
/// # Arguments
/// * `from` - Source directory path
/// * `to` - Destination directory path
///
/// 将 `from` 的每个条目复制到已存在的目录 `to` 中。
/// 文件直接复制，子目录递归复制。`to` 中已存在的文件会被覆盖。
pub fn copy_dir_contents(from: &Path, to: &Path) -> Result<()> {
    let entries = fs::read_dir(from)
        .with_context(|| format!("Failed to read directory: {}", from.display()))?;

    for entry in entries {
        let entry = entry?;
        let src = entry.path();
        if entry.file_type()?.is_dir() {
            copy_dir_into(&src, to)?;
        } else {
            let dst = to.join(entry.file_name());
            fs::copy(&src, &dst).with_context(|| {
                format!("Failed to copy {} to {}", src.display(), dst.display())
            })?;
        }
    }
    Ok(())
}

/// Copies the directory `from` into `to`, producing `to/<name of from>`.
/// A copy left over from an earlier walk is overwritten in place.
///
/// # Arguments
/// * `from` - Source directory path
/// * `to` - Existing destination directory
pub fn copy_dir_into(from: &Path, to: &Path) -> Result<()> {
    let mut options = CopyOptions::new();
    options.overwrite = true;
    copy(from, to, &options).with_context(|| {
        format!("Failed to copy directory {} to {}", from.display(), to.display())
    })?;
    Ok(())
}

/// Empties `path`, creating it if needed. Whatever an earlier walk left there
/// is removed.
///
/// 清空 `path`，必要时创建它。之前遍历留下的内容都会被删除。
pub fn reset_dir(path: &Path) -> Result<()> {
    create(path, true)
        .with_context(|| format!("Failed to reset directory: {}", path.display()))?;
    Ok(())
}

/// Lists the subdirectories of `path` sorted by name. Plain files are ignored.
/// 列出 `path` 的子目录，按名称排序。普通文件被忽略。
pub fn sorted_subdirectories(path: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let entries = fs::read_dir(path)
        .with_context(|| format!("Failed to read directory: {}", path.display()))?;
    for entry in entries {
        let entry = entry?;
        let p = entry.path();
        if p.is_dir() {
            dirs.push(p);
        }
    }
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(dirs)
}

/// Gets the absolute path from a potentially relative path.
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}
