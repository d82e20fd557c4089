//! # Stage Tree Module / 阶段树模块
//!
//! The matrix is a tree of typed stages stored in a flat arena. Every node
//! records its parent id, its kind and its index among siblings of the same
//! kind; its working directory is a pure function of those three values, so
//! a rerun over the same inputs lands in exactly the same directories.
//!
//! 矩阵是一棵存储在扁平 arena 中的类型化阶段树。每个节点记录其父节点 id、
//! 类型以及在同类兄弟节点中的索引；其工作目录是这三个值的纯函数，
//! 因此对相同输入的重新运行会落在完全相同的目录中。
//!
//! ```text
//! <outdir>/build_0000/example_000/command_line_000/run_000
//!                                /analyze_000
//! ```

use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Handle of a node inside a [`StageTree`].
/// [`StageTree`] 中节点的句柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn get(self) -> usize {
        self.0
    }
}

/// The kind of a stage. Determines the directory prefix, the index width and
/// whether the directory is created when the node is inserted.
///
/// 阶段的类型。决定目录前缀、索引宽度以及插入节点时是否创建目录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Build,
    Example,
    CommandLine,
    Analyze,
    Run,
}

impl StageKind {
    pub fn label(self) -> &'static str {
        match self {
            StageKind::Build => "build",
            StageKind::Example => "example",
            StageKind::CommandLine => "command_line",
            StageKind::Analyze => "analyze",
            StageKind::Run => "run",
        }
    }

    fn index_width(self) -> usize {
        match self {
            StageKind::Build => 4,
            _ => 3,
        }
    }

    /// Builds create their directory when they compile; analyses never need one.
    pub fn creates_directory(self) -> bool {
        matches!(
            self,
            StageKind::Example | StageKind::CommandLine | StageKind::Run
        )
    }

    /// The kind a parent must have, `None` for root-level stages.
    fn parent_kind(self) -> Option<StageKind> {
        match self {
            StageKind::Build => None,
            StageKind::Example => Some(StageKind::Build),
            StageKind::CommandLine | StageKind::Analyze => Some(StageKind::Example),
            StageKind::Run => Some(StageKind::CommandLine),
        }
    }

    /// Directory name of the `index`-th node of this kind, e.g. `run_007`.
    pub fn directory_name(self, index: usize) -> String {
        format!("{}_{:0width$}", self.label(), index, width = self.index_width())
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One arena record. Parents do not know their children; the tree only ever
/// points upward.
///
/// 一条 arena 记录。父节点不知道其子节点；树只向上引用。
#[derive(Debug, Clone)]
pub struct StageNode {
    pub parent: Option<NodeId>,
    pub kind: StageKind,
    pub index: usize,
    pub target_directory: PathBuf,
}

/// Flat arena holding every stage node of one matrix walk.
/// 保存一次矩阵遍历中所有阶段节点的扁平 arena。
#[derive(Debug)]
pub struct StageTree {
    root: PathBuf,
    nodes: Vec<StageNode>,
    next_index: HashMap<(Option<NodeId>, StageKind), usize>,
}

impl StageTree {
    /// Creates an empty tree whose builds live directly below `root`.
    /// `root` should be absolute so that every derived path is absolute too.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            nodes: Vec::new(),
            next_index: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pure directory derivation: `parent_dir/<kind>_<zero padded index>`.
    /// 纯目录推导：`parent_dir/<kind>_<补零索引>`。
    pub fn derive_directory(parent_dir: &Path, kind: StageKind, index: usize) -> PathBuf {
        parent_dir.join(kind.directory_name(index))
    }

    /// Inserts a node, assigning the next contiguous index among its siblings of
    /// the same kind, and creates its directory if the kind requires one.
    ///
    /// # Errors
    /// Fails if the parent has the wrong kind for `kind`, or if the directory
    /// cannot be created.
    ///
    /// 插入一个节点，为其分配同类兄弟节点中下一个连续的索引，
    /// 并在类型需要时创建其目录。
    pub fn add(&mut self, parent: Option<NodeId>, kind: StageKind) -> Result<NodeId> {
        let parent_kind = parent.map(|p| self.node(p).kind);
        if parent_kind != kind.parent_kind() {
            bail!(
                "a `{}` stage cannot be attached below {}",
                kind,
                parent_kind.map_or_else(|| "the output root".to_string(), |k| format!("a `{}` stage", k))
            );
        }

        let index = self.next_index.get(&(parent, kind)).copied().unwrap_or(0);

        let parent_dir = match parent {
            Some(p) => self.node(p).target_directory.as_path(),
            None => self.root.as_path(),
        };
        let target_directory = Self::derive_directory(parent_dir, kind, index);

        if kind.creates_directory() {
            fs::create_dir_all(&target_directory).with_context(|| {
                format!("Failed to create stage directory: {}", target_directory.display())
            })?;
        }

        self.next_index.insert((parent, kind), index + 1);
        let id = NodeId(self.nodes.len());
        self.nodes.push(StageNode {
            parent,
            kind,
            index,
            target_directory,
        });
        Ok(id)
    }

    /// # Panics
    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &StageNode {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Number of ancestors above `id`; stage listings are indented by it.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(c) = current {
            depth += 1;
            current = self.parent(c);
        }
        depth
    }

    /// Directory of `id` relative to the tree root, used in reports.
    pub fn relative_directory(&self, id: NodeId) -> PathBuf {
        let dir = &self.node(id).target_directory;
        dir.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| dir.clone())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
