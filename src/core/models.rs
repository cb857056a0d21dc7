//! # Data Models Module / 数据模型模块
//!
//! Value types describing a test point: its kind, its directive, the outcome
//! of its body, its terminal status and the rendered-ready [`Report`] the
//! execution engine hands to the line formatter. Also holds the pure rules
//! that combine those values.
//!
//! 描述测试点的值类型：种类、指令、测试体的结果、最终状态以及执行引擎交给
//! 行格式化器的 [`Report`]。同时包含组合这些值的纯规则。

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::time::Duration;

use crate::core::config::DirectiveFlag;

/// The declaration form that created a node.
/// 创建节点所使用的声明形式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    /// The implicit top-level node; exactly one per harness.
    Root,
    /// `describe`: groups children, its body only declares.
    Suite,
    /// `it`: a leaf test body.
    Unit,
    /// `test`: a test body with a context that may declare sub-tests.
    Case,
}

/// How a node's outcome is executed and interpreted. Fixed at declaration time.
/// 决定节点如何执行及其结果如何解释的指令，在声明时确定。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    #[default]
    None,
    Skip(Option<String>),
    Todo(Option<String>),
}

impl Directive {
    /// Combines the `skip` and `todo` switches. Skip is the stronger exclusion and wins.
    /// 合并 `skip` 与 `todo` 开关，skip 是更强的排除，优先生效。
    pub fn resolve(skip: &DirectiveFlag, todo: &DirectiveFlag) -> Self {
        if skip.is_set() {
            Directive::Skip(skip.reason().map(str::to_string))
        } else if todo.is_set() {
            Directive::Todo(todo.reason().map(str::to_string))
        } else {
            Directive::None
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Directive::Skip(_))
    }

    pub fn is_todo(&self) -> bool {
        matches!(self, Directive::Todo(_))
    }
}

/// Terminal pass/fail state of a node. Absent (`None`) until the node has run.
/// 节点的最终通过/失败状态。节点运行之前为空。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ok,
    NotOk,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

/// Why a body failed.
/// 测试体失败的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureReason {
    /// The body returned an `Err`.
    /// 测试体返回了 `Err`。
    Error,
    /// The body panicked, typically from a failed assertion.
    /// 测试体发生 panic，通常源自断言失败。
    Panic,
    /// The body exceeded its configured timeout.
    /// 测试体超出了配置的超时时间。
    Timeout,
    /// The node or one of its ancestors was aborted before or while it ran.
    /// 节点或其祖先在运行前或运行中被中止。
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureReason::Error => "error",
            FailureReason::Panic => "panic",
            FailureReason::Timeout => "timeout",
            FailureReason::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// A caught body failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub reason: FailureReason,
    pub message: String,
}

impl Failure {
    pub fn error(error: &anyhow::Error) -> Self {
        Self {
            reason: FailureReason::Error,
            message: format!("{error:#}"),
        }
    }

    /// Extracts the message out of a panic payload.
    /// 从 panic 负载中提取消息。
    pub fn panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
            .unwrap_or_else(|| "test body panicked".to_string());
        Self {
            reason: FailureReason::Panic,
            message,
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        Self {
            reason: FailureReason::Timeout,
            message: format!("test timed out after {}ms", limit.as_millis()),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            reason: FailureReason::Cancelled,
            message: "test was aborted before it could finish".to_string(),
        }
    }
}

/// The interpreted result of running one node's own body.
/// 单个节点自身测试体运行后的解释结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Passed,
    Failed(Failure),
    Skipped(Option<String>),
    TodoPassed(Option<String>),
    TodoFailed(Option<String>, Failure),
}

impl Outcome {
    /// Interprets a body result under the node's directive.
    /// 在节点指令下解释测试体的结果。
    pub fn settle(directive: &Directive, body: Result<(), Failure>) -> Self {
        match (directive, body) {
            (Directive::Skip(reason), _) => Outcome::Skipped(reason.clone()),
            (Directive::Todo(reason), Ok(())) => Outcome::TodoPassed(reason.clone()),
            (Directive::Todo(reason), Err(failure)) => Outcome::TodoFailed(reason.clone(), failure),
            (Directive::None, Ok(())) => Outcome::Passed,
            (Directive::None, Err(failure)) => Outcome::Failed(failure),
        }
    }

    /// Status rendered on the node's own result line. Only a plain failure is `not ok`.
    pub fn status(&self) -> Status {
        match self {
            Outcome::Failed(_) => Status::NotOk,
            _ => Status::Ok,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Failed(failure) | Outcome::TodoFailed(_, failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_todo(&self) -> bool {
        matches!(self, Outcome::TodoPassed(_) | Outcome::TodoFailed(..))
    }
}

/// Aggregates a node's terminal status from its own outcome and its children's statuses.
///
/// Skipped and todo nodes are always `Ok`, so neither ever flips a parent. Any
/// other node is `Ok` iff its own body passed and every counted child is `Ok`.
///
/// 由节点自身结果与子节点状态聚合出最终状态。跳过与 todo 节点始终为 `Ok`，
/// 因此永远不会使父节点失败。
pub fn aggregate<I>(directive: &Directive, own: &Outcome, children: I) -> Status
where
    I: IntoIterator<Item = Status>,
{
    match directive {
        Directive::Skip(_) | Directive::Todo(_) => Status::Ok,
        Directive::None => {
            if own.status().is_ok() && children.into_iter().all(Status::is_ok) {
                Status::Ok
            } else {
                Status::NotOk
            }
        }
    }
}

/// The fully determined result of one node and its enumerated subtree.
/// 单个节点及其已枚举子树的完整结果。
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub name: String,
    pub kind: Kind,
    /// Indentation of the node's nested lines (plan, children, diagnostics).
    #[serde(skip)]
    pub indent: String,
    pub outcome: Outcome,
    pub status: Status,
    pub children: Vec<Report>,
    pub diagnostics: Vec<String>,
    pub duration: Duration,
}

impl Report {
    /// Finds a direct child report by name.
    pub fn child(&self, name: &str) -> Option<&Report> {
        self.children.iter().find(|child| child.name == name)
    }
}

/// Counts over every test point of a finished run.
/// 一次已完成运行中所有测试点的统计。
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Aggregate status of the root.
    pub status: Status,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub todo: usize,
    pub duration: Duration,
    /// Reports of the root's enumerated children, in declaration order.
    pub reports: Vec<Report>,
}

impl RunSummary {
    pub fn new(status: Status, reports: Vec<Report>, duration: Duration) -> Self {
        let mut summary = Self {
            status,
            total: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            todo: 0,
            duration,
            reports: Vec::new(),
        };
        for report in &reports {
            summary.count(report);
        }
        summary.reports = reports;
        summary
    }

    fn count(&mut self, report: &Report) {
        self.total += 1;
        match report.outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::TodoPassed(_) | Outcome::TodoFailed(..) => self.todo += 1,
        }
        for child in &report.children {
            self.count(child);
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Finds a top-level report by name.
    pub fn report(&self, name: &str) -> Option<&Report> {
        self.reports.iter().find(|report| report.name == name)
    }
}
