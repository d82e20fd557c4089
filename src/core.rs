//! # Core Module / 核心模块
//!
//! This module contains the core functionality of reggie: parameter
//! combinations, the stage tree, the five stage types, configuration and the
//! matrix walk that ties them together.
//!
//! 此模块包含 reggie 的核心功能：参数组合、阶段树、五种阶段类型、
//! 配置以及将它们联系在一起的矩阵遍历。

pub mod combinations;
pub mod config;
pub mod execution;
pub mod models;
pub mod params;
pub mod stages;
pub mod tree;

// Re-exports
pub use config::RegressionConfig;
pub use execution::{MatrixSettings, run_matrix};
pub use models::MatrixReport;
pub use params::ParameterMapping;
