//! # Declaration API / 声明 API
//!
//! `describe`, `it` and `test` entry points with their `_skip`/`_todo` sugar
//! and `_with` variants taking explicit [`TestOptions`]. The same [`Declare`]
//! surface is available on the [`Harness`] (top level), inside a `describe`
//! body ([`SuiteContext`]) and inside a `test` body ([`TestContext`]).
//!
//! `describe`、`it`、`test` 入口及其 `_skip`/`_todo` 语法糖和接受显式选项的
//! `_with` 变体。同一套 `Declare` 接口可在 `Harness`、`describe` 体与 `test` 体中使用。
//!
//! ```no_run
//! use quicktap::{Declare, Harness};
//!
//! # async fn demo() -> Result<(), quicktap::Error> {
//! let harness = Harness::new();
//! harness.describe("math", |s| async move {
//!     s.it("adds", || async {
//!         assert_eq!(1 + 1, 2);
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//! harness.run().await?;
//! # Ok(())
//! # }
//! ```

use futures::FutureExt;
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::core::config::{RunConfig, TestOptions};
use crate::core::error::Error;
use crate::core::execution;
use crate::core::models::{Kind, RunSummary};
use crate::core::node::{Body, TestNode};
use crate::infra::sink::{Sink, StdoutSink};

/// Declaration entry points shared by every scope that can own children.
///
/// Each call constructs a child of the current scope and registers it; none of
/// them runs a body. Declaring into a scope that already sealed its children
/// fails with [`Error::LateDeclaration`].
///
/// 所有可拥有子节点的作用域共享的声明入口。每次调用只构造并注册子节点，
/// 不会运行测试体。
pub trait Declare {
    /// The node new declarations are attached to.
    fn scope(&self) -> &TestNode;

    fn describe_with<F, Fut>(&self, name: &str, options: TestOptions, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce(SuiteContext) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        let body: Body = Box::new(move |node| body(SuiteContext { node }).boxed_local());
        TestNode::declare(self.scope(), name, Kind::Suite, options, Some(body))
    }

    fn describe<F, Fut>(&self, name: &str, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce(SuiteContext) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.describe_with(name, TestOptions::default(), body)
    }

    fn describe_skip<F, Fut>(&self, name: &str, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce(SuiteContext) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.describe_with(name, TestOptions::default().skip(true), body)
    }

    fn describe_todo<F, Fut>(&self, name: &str, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce(SuiteContext) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.describe_with(name, TestOptions::default().todo(true), body)
    }

    fn it_with<F, Fut>(&self, name: &str, options: TestOptions, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        let body: Body = Box::new(move |_node: TestNode| body().boxed_local());
        TestNode::declare(self.scope(), name, Kind::Unit, options, Some(body))
    }

    fn it<F, Fut>(&self, name: &str, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.it_with(name, TestOptions::default(), body)
    }

    fn it_skip<F, Fut>(&self, name: &str, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.it_with(name, TestOptions::default().skip(true), body)
    }

    fn it_todo<F, Fut>(&self, name: &str, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.it_with(name, TestOptions::default().todo(true), body)
    }

    fn test_with<F, Fut>(&self, name: &str, options: TestOptions, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce(TestContext) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        let body: Body = Box::new(move |node| body(TestContext { node }).boxed_local());
        TestNode::declare(self.scope(), name, Kind::Case, options, Some(body))
    }

    fn test<F, Fut>(&self, name: &str, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce(TestContext) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.test_with(name, TestOptions::default(), body)
    }

    fn test_skip<F, Fut>(&self, name: &str, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce(TestContext) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.test_with(name, TestOptions::default().skip(true), body)
    }

    fn test_todo<F, Fut>(&self, name: &str, body: F) -> Result<TestNode, Error>
    where
        F: FnOnce(TestContext) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.test_with(name, TestOptions::default().todo(true), body)
    }
}

/// Handle passed to a `describe` body.
/// 传递给 `describe` 体的句柄。
#[derive(Debug, Clone)]
pub struct SuiteContext {
    node: TestNode,
}

impl SuiteContext {
    pub fn name(&self) -> &str {
        self.node.name()
    }

    /// Cancelled when this suite or one of its ancestors is aborted.
    pub fn signal(&self) -> CancellationToken {
        self.node.signal()
    }

    pub fn node(&self) -> &TestNode {
        &self.node
    }
}

impl Declare for SuiteContext {
    fn scope(&self) -> &TestNode {
        &self.node
    }
}

/// Handle passed to a `test` body; sub-tests declared through it run after the body resolves.
/// 传递给 `test` 体的句柄；通过它声明的子测试在测试体结束后运行。
#[derive(Debug, Clone)]
pub struct TestContext {
    node: TestNode,
}

impl TestContext {
    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn signal(&self) -> CancellationToken {
        self.node.signal()
    }

    pub fn node(&self) -> &TestNode {
        &self.node
    }

    /// Queues a free-form diagnostic, emitted as `# <message>` under this test point.
    /// 添加一条自由格式的诊断信息，以 `# <message>` 的形式输出在该测试点之下。
    pub fn diagnostic(&self, message: impl AsRef<str>) {
        self.node.push_diagnostic(message.as_ref());
    }
}

impl Declare for TestContext {
    fn scope(&self) -> &TestNode {
        &self.node
    }
}

/// Owner of the root node and of the protocol sink for exactly one run.
/// 在一次运行中持有根节点与协议输出的对象。
pub struct Harness {
    root: TestNode,
    config: RunConfig,
    sink: Box<dyn Sink>,
}

impl Harness {
    /// A harness writing to standard output with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RunConfig::default(), StdoutSink)
    }

    pub fn with_sink(sink: impl Sink + 'static) -> Self {
        Self::with_config(RunConfig::default(), sink)
    }

    pub fn with_config(config: RunConfig, sink: impl Sink + 'static) -> Self {
        Self {
            root: TestNode::root(),
            config,
            sink: Box::new(sink),
        }
    }

    pub fn root(&self) -> &TestNode {
        &self.root
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Cancelling this token aborts every node that has not finished yet.
    /// 取消此令牌将中止所有尚未完成的节点。
    pub fn signal(&self) -> CancellationToken {
        self.root.signal()
    }

    /// Runs every declared test point and emits the protocol, starting with
    /// `TAP version 14`. A harness runs at most once.
    ///
    /// 运行所有已声明的测试点并输出协议（以 `TAP version 14` 开头）。每个 harness 只能运行一次。
    pub async fn run(&self) -> Result<RunSummary, Error> {
        execution::run_root(&self.root, &self.config, self.sink.as_ref()).await
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Declare for Harness {
    fn scope(&self) -> &TestNode {
        &self.root
    }
}
