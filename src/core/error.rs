//! # Engine Errors / 引擎错误
//!
//! Structural misuse of the declaration API and internal invariant violations.
//! Test body failures are never represented here: they are converted into an
//! [`Outcome`](crate::core::models::Outcome) at the node boundary.
//!
//! 声明 API 的结构性误用以及内部不变量被破坏时的错误。
//! 测试体的失败不在此处表示，它们会在节点边界被转换为 `Outcome`。

use thiserror::Error;

/// Errors raised synchronously to the caller of the engine.
/// 同步返回给引擎调用者的错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A child was declared after its parent had sealed its children.
    /// 在父节点封闭子节点列表之后又声明了子节点。
    #[error("cannot declare `{name}` under `{parent}`: the parent has already finished declaring its children")]
    LateDeclaration { parent: String, name: String },

    /// The status of a node was read before the node finished running.
    /// 在节点运行结束之前读取了它的状态。
    #[error("test point `{name}` has not been run yet")]
    NotRun { name: String },

    /// `run` was invoked on a root that already ran.
    /// 对已经运行过的根节点再次调用了 `run`。
    #[error("this harness has already been run; nodes are terminal and cannot run again")]
    AlreadyRan,

    /// An internal invariant was violated; the protocol stream can no longer be trusted.
    /// 内部不变量被破坏，协议输出已不可信。
    #[error("engine defect: {0}")]
    Engine(String),
}

impl Error {
    /// Whether this error is a usage mistake in the test declaration rather than an engine defect.
    pub fn is_usage(&self) -> bool {
        !matches!(self, Error::Engine(_))
    }
}
