//! # Test Node Module / 测试节点模块
//!
//! The tree entity behind every `describe`/`it`/`test` declaration. A parent
//! owns its children through strong references; a child only keeps a weak
//! back-reference to its scope, so a finished subtree is dropped as soon as
//! nothing else holds on to it.
//!
//! 每个 `describe`/`it`/`test` 声明背后的树节点。父节点以强引用持有子节点，
//! 子节点只保留指向作用域的弱引用，因此运行结束的子树在无人持有时即被释放。

use futures::FutureExt;
use futures::future::{LocalBoxFuture, select_all};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::core::config::TestOptions;
use crate::core::error::Error;
use crate::core::models::{Directive, Failure, Kind, Status};
use crate::reporting::tap;

/// Name given to nodes declared with an empty name.
pub const ANONYMOUS: &str = "<anonymous>";

pub(crate) type BodyFuture = LocalBoxFuture<'static, anyhow::Result<()>>;
pub(crate) type Body = Box<dyn FnOnce(TestNode) -> BodyFuture>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeState {
    Pending,
    Running,
    Done,
}

struct NodeInner {
    name: String,
    kind: Kind,
    scope: Option<Weak<NodeInner>>,
    indent: String,
    directive: Directive,
    only: bool,
    timeout: Option<Duration>,
    concurrency: Option<usize>,
    /// External abort signals of this node and of every ancestor, outermost first.
    signals: Vec<CancellationToken>,
    token: CancellationToken,
    body: RefCell<Option<Body>>,
    children: RefCell<Vec<TestNode>>,
    diagnostics: RefCell<Vec<String>>,
    state: Cell<NodeState>,
    sealed: Cell<bool>,
    on_only_path: Cell<bool>,
    status: Cell<Option<Status>>,
    collected: RefCell<Option<Result<(), Failure>>>,
}

/// A shared handle to one node of the test tree.
/// 指向测试树中某个节点的共享句柄。
#[derive(Clone)]
pub struct TestNode {
    inner: Rc<NodeInner>,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    name: &'a str,
    directive: &'a Directive,
}

impl TestNode {
    pub(crate) fn root() -> Self {
        Self {
            inner: Rc::new(NodeInner {
                name: String::new(),
                kind: Kind::Root,
                scope: None,
                indent: String::new(),
                directive: Directive::None,
                only: false,
                timeout: None,
                concurrency: None,
                signals: Vec::new(),
                token: CancellationToken::new(),
                body: RefCell::new(None),
                children: RefCell::new(Vec::new()),
                diagnostics: RefCell::new(Vec::new()),
                state: Cell::new(NodeState::Pending),
                sealed: Cell::new(false),
                on_only_path: Cell::new(false),
                status: Cell::new(None),
                collected: RefCell::new(None),
            }),
        }
    }

    /// Constructs a node under `scope` and registers it as the scope's last child.
    /// The body is stored, never invoked here.
    ///
    /// 在 `scope` 下构造节点并将其注册为最后一个子节点。此处只保存测试体，不会调用。
    pub(crate) fn declare(
        scope: &TestNode,
        name: &str,
        kind: Kind,
        options: TestOptions,
        body: Option<Body>,
    ) -> Result<TestNode, Error> {
        let name = if name.is_empty() { ANONYMOUS } else { name };
        if scope.inner.sealed.get() {
            return Err(Error::LateDeclaration {
                parent: scope.display_name().to_string(),
                name: name.to_string(),
            });
        }

        let mut signals = scope.inner.signals.clone();
        signals.extend(options.signal.clone());

        let node = TestNode {
            inner: Rc::new(NodeInner {
                name: name.to_string(),
                kind,
                scope: Some(Rc::downgrade(&scope.inner)),
                indent: tap::nested_indent(&scope.inner.indent),
                directive: options.directive(),
                only: options.only,
                timeout: options.timeout,
                concurrency: options.concurrency,
                signals,
                token: scope.inner.token.child_token(),
                body: RefCell::new(body),
                children: RefCell::new(Vec::new()),
                diagnostics: RefCell::new(Vec::new()),
                state: Cell::new(NodeState::Pending),
                sealed: Cell::new(false),
                on_only_path: Cell::new(false),
                status: Cell::new(None),
                collected: RefCell::new(None),
            }),
        };
        trace!(parent = %scope.display_name(), name = %node.name(), ?kind, "declared test point");
        scope.inner.children.borrow_mut().push(node.clone());
        Ok(node)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn kind(&self) -> Kind {
        self.inner.kind
    }

    pub fn directive(&self) -> &Directive {
        &self.inner.directive
    }

    pub fn only(&self) -> bool {
        self.inner.only
    }

    /// Two spaces per ancestor; prefixes every line nested under this node.
    pub fn indent(&self) -> &str {
        &self.inner.indent
    }

    pub fn is_root(&self) -> bool {
        self.inner.scope.is_none()
    }

    /// The owning parent, if it is still alive.
    pub fn scope(&self) -> Option<TestNode> {
        self.inner
            .scope
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| TestNode { inner })
    }

    /// Children in declaration order.
    pub fn children(&self) -> Vec<TestNode> {
        self.inner.children.borrow().clone()
    }

    /// Terminal status. Reading it before the node ran is a usage error.
    /// 最终状态。在节点运行之前读取属于用法错误。
    pub fn status(&self) -> Result<Status, Error> {
        self.inner.status.get().ok_or_else(|| Error::NotRun {
            name: self.display_name().to_string(),
        })
    }

    /// Serializes `{ name, directive }`. Only available once the node has run.
    /// 序列化 `{ name, directive }`，仅在节点运行后可用。
    pub fn to_json(&self) -> Result<String, Error> {
        self.status()?;
        serde_json::to_string(&Snapshot {
            name: &self.inner.name,
            directive: &self.inner.directive,
        })
        .map_err(|e| Error::Engine(format!("failed to serialize `{}`: {e}", self.inner.name)))
    }

    /// The cancellation token observed by this node and inherited by its descendants.
    pub fn signal(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    pub(crate) fn display_name(&self) -> &str {
        if self.is_root() { "<root>" } else { &self.inner.name }
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.inner.timeout
    }

    pub(crate) fn concurrency(&self) -> Option<usize> {
        self.inner.concurrency
    }

    pub(crate) fn state(&self) -> NodeState {
        self.inner.state.get()
    }

    pub(crate) fn set_state(&self, state: NodeState) {
        self.inner.state.set(state);
    }

    /// Closes the children collection; later declarations are rejected.
    pub(crate) fn seal(&self) {
        self.inner.sealed.set(true);
    }

    pub(crate) fn take_body(&self) -> Option<Body> {
        self.inner.body.borrow_mut().take()
    }

    pub(crate) fn on_only_path(&self) -> bool {
        self.inner.on_only_path.get()
    }

    pub(crate) fn set_on_only_path(&self, value: bool) {
        self.inner.on_only_path.set(value);
    }

    pub(crate) fn store_collected(&self, result: Result<(), Failure>) {
        *self.inner.collected.borrow_mut() = Some(result);
    }

    pub(crate) fn take_collected(&self) -> Option<Result<(), Failure>> {
        self.inner.collected.borrow_mut().take()
    }

    pub(crate) fn push_diagnostic(&self, message: &str) {
        self.inner.diagnostics.borrow_mut().push(message.to_string());
    }

    pub(crate) fn take_diagnostics(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.diagnostics.borrow_mut())
    }

    /// The single write point for `status`.
    /// `status` 的唯一写入点。
    pub(crate) fn finish(&self, status: Status) -> Result<(), Error> {
        if self.inner.status.get().is_some() {
            return Err(Error::Engine(format!(
                "status of `{}` written twice",
                self.display_name()
            )));
        }
        self.inner.status.set(Some(status));
        self.inner.state.set(NodeState::Done);
        Ok(())
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.inner.token.is_cancelled()
            || self.inner.signals.iter().any(CancellationToken::is_cancelled)
    }

    /// Resolves once this node's scope chain is cancelled or the external signal
    /// of this node or of any ancestor fires.
    pub(crate) async fn aborted(&self) {
        let waits = std::iter::once(&self.inner.token)
            .chain(&self.inner.signals)
            .map(|token| token.cancelled().boxed_local());
        select_all(waits).await;
    }

    /// Cancels this node's token, short-circuiting every descendant that has not finished.
    pub(crate) fn abort(&self) {
        self.inner.token.cancel();
    }
}

impl fmt::Debug for TestNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestNode")
            .field("name", &self.inner.name)
            .field("kind", &self.inner.kind)
            .field("directive", &self.inner.directive)
            .field("only", &self.inner.only)
            .field("status", &self.inner.status.get())
            .field("children", &self.inner.children.borrow().len())
            .finish_non_exhaustive()
    }
}
