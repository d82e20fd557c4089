//! # Analyze Stage / 分析阶段
//!
//! Analysis parameter combinations of an example. They are siblings of the
//! command lines, not parents of runs, and are only carried forward for a
//! later comparison pass; no directory is created for them.
//!
//! 示例的分析参数组合。它们是命令行的兄弟节点，而不是运行的父节点，
//! 仅为后续的比较过程保留；不会为其创建目录。

use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::combinations;
use crate::core::params::ParameterMapping;
use crate::core::stages::Example;
use crate::core::tree::{NodeId, StageKind, StageTree};
use crate::infra::fmt::indent;

#[derive(Debug, Clone)]
pub struct Analyze {
    pub id: NodeId,
    pub index: usize,
    /// Derived but never created.
    pub target_directory: PathBuf,
    pub parameters: ParameterMapping,
    pub depth: usize,
}

impl Analyze {
    pub fn new(tree: &mut StageTree, parameters: ParameterMapping, example: &Example) -> Result<Self> {
        let id = tree.add(Some(example.id), StageKind::Analyze)?;
        let node = tree.node(id);
        Ok(Self {
            id,
            index: node.index,
            target_directory: node.target_directory.clone(),
            parameters,
            depth: tree.depth(id),
        })
    }
}

/// Expands the example's analysis declaration. An example without one simply
/// has no analyses.
///
/// 展开示例的分析声明。没有分析声明的示例就没有分析。
pub fn get_analyzes(tree: &mut StageTree, path: &Path, example: &Example) -> Result<Vec<Analyze>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    // parse everything first so a bad file leaves no half-registered nodes behind
    let combinations = combinations::get_combinations(path)?;
    combinations
        .into_iter()
        .map(|parameters| Analyze::new(tree, parameters, example))
        .collect()
}

impl fmt::Display for Analyze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("analyze parameters:\n{}", self.parameters);
        f.write_str(&indent(&s, self.depth))
    }
}
