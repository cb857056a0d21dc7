//! # Infrastructure Module / 基础设施模块
//!
//! Transport of emitted protocol lines.
//!
//! 已输出协议行的传输。

pub mod sink;

pub use sink::{BufferSink, Sink, StdoutSink};
