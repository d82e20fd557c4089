//! # Stages Module / 阶段模块
//!
//! The five stage types of the matrix and the functions that enumerate them.
//! Every stage is a thin state holder registered in a [`StageTree`]; only
//! builds and runs execute anything.
//!
//! 矩阵的五种阶段类型以及枚举它们的函数。每个阶段都是注册在
//! [`StageTree`] 中的轻量状态容器；只有构建和运行会执行操作。
//!
//! [`StageTree`]: crate::core::tree::StageTree

pub mod analyze;
pub mod build;
pub mod command_line;
pub mod example;
pub mod run;

pub use analyze::{Analyze, get_analyzes};
pub use build::{Build, get_builds};
pub use command_line::{CommandLine, CommandLineOptions, get_command_lines};
pub use example::{Example, get_examples};
pub use run::{LaunchSettings, Run, get_runs};
