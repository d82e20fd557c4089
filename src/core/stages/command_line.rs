//! # Command Line Stage / 命令行阶段
//!
//! One node per combination of `command_line.ini`. The free-form parameters
//! that change how the binary is invoked (`MPI`, `cmd_suffix`) are validated
//! here, once, into [`CommandLineOptions`].
//!
//! `command_line.ini` 的每个组合对应一个节点。改变二进制调用方式的参数
//! （`MPI`、`cmd_suffix`）在此处统一验证为 [`CommandLineOptions`]。

use anyhow::{Context, Result, bail};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::combinations;
use crate::core::params::ParameterMapping;
use crate::core::stages::Example;
use crate::core::tree::{NodeId, StageKind, StageTree};
use crate::infra::fmt::indent;

/// Parameter naming the number of MPI ranks.
pub const MPI_KEY: &str = "MPI";
/// Parameter holding an extra token appended to the run command.
pub const CMD_SUFFIX_KEY: &str = "cmd_suffix";

/// Invocation options extracted from the command-line parameters.
/// 从命令行参数中提取的调用选项。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLineOptions {
    /// Number of ranks requested from the MPI launcher.
    /// 向 MPI 启动器请求的进程数。
    pub mpi_ranks: Option<u32>,
    /// Appended verbatim as a single argument after `parameter.ini`.
    /// 作为单个参数原样追加在 `parameter.ini` 之后。
    pub cmd_suffix: Option<String>,
}

impl CommandLineOptions {
    /// # Errors
    /// `MPI` must be a positive integer.
    pub fn from_parameters(parameters: &ParameterMapping) -> Result<Self> {
        let mpi_ranks = match parameters.get(MPI_KEY) {
            Some(raw) => {
                let ranks: u32 = raw
                    .parse()
                    .with_context(|| format!("`{}` must be a rank count, found `{}`", MPI_KEY, raw))?;
                if ranks == 0 {
                    bail!("`{}` must be at least 1", MPI_KEY);
                }
                Some(ranks)
            }
            None => None,
        };
        Ok(Self {
            mpi_ranks,
            cmd_suffix: parameters.get(CMD_SUFFIX_KEY).map(str::to_string),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CommandLine {
    pub id: NodeId,
    pub index: usize,
    pub target_directory: PathBuf,
    pub parameters: ParameterMapping,
    pub options: CommandLineOptions,
    pub depth: usize,
}

impl CommandLine {
    pub fn new(tree: &mut StageTree, parameters: ParameterMapping, example: &Example) -> Result<Self> {
        let options = CommandLineOptions::from_parameters(&parameters)?;
        let id = tree.add(Some(example.id), StageKind::CommandLine)?;
        let node = tree.node(id);
        Ok(Self {
            id,
            index: node.index,
            target_directory: node.target_directory.clone(),
            parameters,
            options,
            depth: tree.depth(id),
        })
    }
}

/// Expands the example's command-line declaration into one node per combination.
///
/// # Errors
/// A missing or malformed declaration file, or an invalid `MPI` value.
///
/// 将示例的命令行声明展开为每个组合一个节点。
pub fn get_command_lines(
    tree: &mut StageTree,
    path: &Path,
    example: &Example,
) -> Result<Vec<CommandLine>> {
    if !path.is_file() {
        bail!("Example `{}` has no command line declaration: {}", example.name, path.display());
    }
    let mut command_lines = Vec::new();
    for parameters in combinations::get_combinations(path)? {
        let command_line = CommandLine::new(tree, parameters, example)
            .with_context(|| format!("Invalid command line in {}", path.display()))?;
        command_lines.push(command_line);
    }
    Ok(command_lines)
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = format!("command_line parameters:\n{}", self.parameters);
        f.write_str(&indent(&s, self.depth))
    }
}
