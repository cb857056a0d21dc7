//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! Walks the test tree and turns every node into a [`Report`]. The run has two
//! passes:
//!
//! 1. **Collection**: every `describe` body runs, in declaration order, so the
//!    suite tree is fully declared before the `only` planner looks at it.
//! 2. **Execution**: children of a node are started together and joined with an
//!    order-preserving buffer, so reports come back in declaration order no
//!    matter which body finishes first. The root streams each finished
//!    top-level block to the sink as soon as all of its predecessors are out.
//!
//! A body that returns `Err`, panics, times out or gets aborted is caught at
//! the node boundary and becomes a failed outcome; it never reaches a sibling.
//!
//! 遍历测试树并将每个节点转换为 `Report`。运行分为收集与执行两个阶段：
//! 收集阶段按声明顺序执行所有 `describe` 体；执行阶段同时启动同级子节点，
//! 并以保持顺序的缓冲收集结果，因此输出始终遵循声明顺序。

use futures::future::LocalBoxFuture;
use futures::{FutureExt, StreamExt, stream};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::core::config::RunConfig;
use crate::core::error::Error;
use crate::core::models::{Failure, Kind, Outcome, Report, RunSummary, aggregate};
use crate::core::node::{Body, NodeState, TestNode};
use crate::core::planner::RunFilter;
use crate::infra::sink::Sink;
use crate::reporting::tap;

/// Runs the whole tree under `root`, emitting the protocol to `sink`.
/// 运行 `root` 之下的整棵树，并将协议输出到 `sink`。
pub(crate) async fn run_root(
    root: &TestNode,
    config: &RunConfig,
    sink: &dyn Sink,
) -> Result<RunSummary, Error> {
    if root.state() != NodeState::Pending {
        return Err(Error::AlreadyRan);
    }
    root.set_state(NodeState::Running);
    root.seal();
    let started = Instant::now();

    sink.emit(tap::VERSION_HEADER);

    collect(root, config).await;
    let engine = Engine {
        config,
        filter: RunFilter::plan(root),
    };
    debug!(only = engine.filter.only_active, "run planned");

    let children = engine.filter.select(root.children(), false);
    sink.emit(&tap::plan_line(root.indent(), children.len()));

    let mut reports = Vec::with_capacity(children.len());
    let mut points = stream::iter(children)
        .map(|child| engine.run_node(child, false))
        .buffered(engine.limit(root));
    while let Some(report) = points.next().await {
        let report = report?;
        for line in tap::render_point(&report, reports.len() + 1, root.indent(), config.details) {
            sink.emit(&line);
        }
        reports.push(report);
    }
    drop(points);

    let status = aggregate(
        root.directive(),
        &Outcome::Passed,
        reports.iter().map(|report| report.status),
    );
    root.finish(status)?;
    debug!(?status, elapsed = ?started.elapsed(), "run finished");
    Ok(RunSummary::new(status, reports, started.elapsed()))
}

/// Runs every non-skipped `describe` body below `node`, depth first in declaration order.
/// 按声明顺序深度优先执行 `node` 之下所有未跳过的 `describe` 体。
fn collect<'a>(node: &'a TestNode, config: &'a RunConfig) -> LocalBoxFuture<'a, ()> {
    async move {
        for child in node.children() {
            if child.kind() != Kind::Suite || child.directive().is_skip() {
                continue;
            }
            trace!(name = %child.name(), "collecting suite");
            let result = invoke_body(&child, config).await;
            child.store_collected(result);
            collect(&child, config).await;
        }
    }
    .boxed_local()
}

struct Engine<'a> {
    config: &'a RunConfig,
    filter: RunFilter,
}

impl Engine<'_> {
    fn limit(&self, node: &TestNode) -> usize {
        node.concurrency()
            .or(self.config.concurrency)
            .unwrap_or(usize::MAX)
            .max(1)
    }

    fn run_node(&self, node: TestNode, in_only_scope: bool) -> LocalBoxFuture<'_, Result<Report, Error>> {
        async move {
            let started = Instant::now();

            if node.directive().is_skip() {
                debug!(name = %node.name(), "skipping test point");
                drop(node.take_body());
                node.seal();
                return self.settle(&node, Ok(()), Vec::new(), started);
            }
            if node.is_aborted() {
                debug!(name = %node.name(), "aborted before start");
                drop(node.take_body());
                node.seal();
                return self.settle(&node, Err(Failure::cancelled()), Vec::new(), started);
            }

            node.set_state(NodeState::Running);
            trace!(name = %node.name(), "running test point");
            let own = match node.take_collected() {
                Some(result) => result,
                None => invoke_body(&node, self.config).await,
            };

            let scope = in_only_scope || node.only();
            let children = self.filter.select(node.children(), scope);
            let join = stream::iter(children)
                .map(|child| self.run_node(child, scope))
                .buffered(self.limit(&node))
                .collect::<Vec<_>>();
            // A suite body only declares, so its timeout bounds the run of its children.
            let (results, expired) = match node.timeout().filter(|_| node.kind() == Kind::Suite) {
                Some(limit) => bounded(&node, limit, join).await,
                None => (join.await, None),
            };
            let reports = results.into_iter().collect::<Result<Vec<_>, _>>()?;
            let own = match (own, expired) {
                (Ok(()), Some(limit)) => Err(Failure::timeout(limit)),
                (own, _) => own,
            };

            self.settle(&node, own, reports, started)
        }
        .boxed_local()
    }

    fn settle(
        &self,
        node: &TestNode,
        body: Result<(), Failure>,
        children: Vec<Report>,
        started: Instant,
    ) -> Result<Report, Error> {
        let outcome = Outcome::settle(node.directive(), body);
        let status = aggregate(
            node.directive(),
            &outcome,
            children.iter().map(|child| child.status),
        );
        node.finish(status)?;
        if let Some(failure) = outcome.failure() {
            debug!(name = %node.name(), reason = %failure.reason, "test point failed: {}", failure.message);
        }

        Ok(Report {
            name: node.name().to_string(),
            kind: node.kind(),
            indent: node.indent().to_string(),
            outcome,
            status,
            children,
            diagnostics: node.take_diagnostics(),
            duration: started.elapsed(),
        })
    }
}

/// Invokes the node's body once, if it has one, then seals its children.
/// 调用节点的测试体（若存在且仅调用一次），随后封闭其子节点列表。
async fn invoke_body(node: &TestNode, config: &RunConfig) -> Result<(), Failure> {
    let result = match node.take_body() {
        Some(body) => guard(node, body, node.timeout().or(config.timeout)).await,
        None => Ok(()),
    };
    node.seal();
    result
}

/// Converts every way a body can go wrong into a [`Failure`].
async fn guard(node: &TestNode, body: Body, limit: Option<Duration>) -> Result<(), Failure> {
    let future = match panic::catch_unwind(AssertUnwindSafe(|| body(node.clone()))) {
        Ok(future) => future,
        Err(payload) => return Err(Failure::panic(payload)),
    };
    let guarded = AssertUnwindSafe(future).catch_unwind();

    tokio::select! {
        biased;
        _ = node.aborted() => {
            debug!(name = %node.name(), "aborted while running");
            node.abort();
            Err(Failure::cancelled())
        }
        result = within(limit, guarded) => match result {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(error))) => Err(Failure::error(&error)),
            Ok(Err(payload)) => Err(Failure::panic(payload)),
            Err(limit) => {
                debug!(name = %node.name(), ?limit, "timed out");
                node.abort();
                Err(Failure::timeout(limit))
            }
        },
    }
}

/// Drives `join` to completion. When `limit` elapses first, the node is aborted so
/// unfinished descendants settle as cancelled, and the elapsed limit is returned
/// next to their reports.
///
/// 驱动 `join` 直至完成。若先到达 `limit`，则中止该节点，使未完成的后代以取消结束，
/// 并与其报告一起返回超时时长。
async fn bounded<F: Future>(node: &TestNode, limit: Duration, join: F) -> (F::Output, Option<Duration>) {
    let mut join = std::pin::pin!(join);
    tokio::select! {
        biased;
        output = &mut join => (output, None),
        _ = tokio::time::sleep(limit) => {
            debug!(name = %node.name(), ?limit, "timed out while running children");
            node.abort();
            (join.await, Some(limit))
        }
    }
}

/// Awaits `future`, giving up after `limit` if one is set.
async fn within<F: Future>(limit: Option<Duration>, future: F) -> Result<F::Output, Duration> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future).await.map_err(|_| limit),
        None => Ok(future.await),
    }
}
