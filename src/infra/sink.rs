//! # Protocol Sink Module / 协议输出模块
//!
//! The engine only needs "emit one line of text". [`StdoutSink`] is the
//! default transport; [`BufferSink`] keeps the lines in memory, which is what
//! the integration tests and embedding callers use.
//!
//! 引擎只需要“输出一行文本”。`StdoutSink` 是默认输出，`BufferSink` 将行保存在内存中。

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// A destination for protocol lines. Each call receives one line without its newline.
/// 协议行的目的地。每次调用接收一行，不含换行符。
pub trait Sink {
    fn emit(&self, line: &str);
}

impl<F> Sink for F
where
    F: Fn(&str),
{
    fn emit(&self, line: &str) {
        self(line)
    }
}

/// Writes every line to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn emit(&self, line: &str) {
        let mut out = io::stdout().lock();
        // A closed stdout (e.g. `| head`) must not take the run down with it.
        if writeln!(out, "{line}").and_then(|_| out.flush()).is_err() {
            tracing::warn!("failed to write protocol line to stdout");
        }
    }
}

/// Collects lines in a shared in-memory buffer. Clones share the same buffer.
/// 将行收集到共享的内存缓冲区中，克隆体共享同一缓冲区。
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// The emitted stream as text, each line terminated by `\n`.
    pub fn contents(&self) -> String {
        self.lines
            .borrow()
            .iter()
            .map(|line| format!("{line}\n"))
            .collect()
    }
}

impl Sink for BufferSink {
    fn emit(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }
}
