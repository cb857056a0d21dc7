//! # Core Module / 核心模块
//!
//! The test tree, its value types and the engine that runs it.
//!
//! 测试树、其值类型以及运行它的引擎。

pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod node;
pub mod planner;

// Re-exports
pub use models::{Outcome, Report, Status};
pub use node::TestNode;
