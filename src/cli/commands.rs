//! # Subcommands / 子命令
//!
//! - `run` - walk the regression matrix / 遍历回归矩阵
//! - `init` - write a starter configuration / 写入初始配置

pub mod init;
pub mod run;
