//! # Reporting Module / 报告模块
//!
//! Renders run results: TAP protocol lines for machines and a colored
//! summary for humans.
//!
//! 渲染运行结果：面向机器的 TAP 协议行与面向人的彩色摘要。

pub mod console;
pub mod tap;

// Re-export common reporting functions
pub use console::print_summary;
pub use tap::render_point;
