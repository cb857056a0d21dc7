//! # QuickTap Library / QuickTap 库
//!
//! A hierarchical test-declaration engine. Tests are declared with nested
//! `describe`/`it`/`test` blocks under an explicitly constructed [`Harness`],
//! executed with single-threaded cooperative concurrency, and reported as
//! Test Anything Protocol version 14 lines.
//!
//! 一个分层的测试声明引擎。测试通过嵌套的 `describe`/`it`/`test` 块在显式构造的
//! `Harness` 下声明，以单线程协作式并发执行，并以 TAP 14 协议行输出结果。
//!
//! ## Modules / 模块
//!
//! - `api` - Declaration entry points and the harness
//! - `core` - Test nodes, data models, configuration, planning and the execution engine
//! - `infra` - Protocol sinks
//! - `reporting` - TAP line formatting and console summaries
//! - `cli` - Command-line front end of the `quicktap` binary
//!
//! - `api` - 声明入口与 harness
//! - `core` - 测试节点、数据模型、配置、规划与执行引擎
//! - `infra` - 协议输出
//! - `reporting` - TAP 行格式化与控制台摘要
//! - `cli` - `quicktap` 可执行文件的命令行前端

pub mod api;
pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::api::{Declare, Harness, SuiteContext, TestContext};
pub use crate::core::config::{DirectiveFlag, RunConfig, TestOptions};
pub use crate::core::error::Error;
pub use crate::core::models::{
    Directive, Failure, FailureReason, Kind, Outcome, Report, RunSummary, Status,
};
pub use crate::core::node::TestNode;
pub use crate::infra::sink::{BufferSink, Sink, StdoutSink};
