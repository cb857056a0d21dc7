//! # Run-Set Planner Module / 运行集规划模块
//!
//! Decides which declared nodes are enumerated in a run. When any node of the
//! collected tree carries `only`, a node runs iff it, an ancestor or a
//! descendant is `only`-marked; otherwise every node runs.
//!
//! 决定一次运行中枚举哪些已声明节点。若收集到的树中任一节点带有 `only`，
//! 则只有自身、祖先或后代带 `only` 标记的节点才会运行；否则所有节点都会运行。

use crate::core::node::TestNode;

/// Whether the run is restricted to `only`-marked paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunFilter {
    pub only_active: bool,
}

impl RunFilter {
    /// Walks the whole declared tree once, marking every node that is `only`
    /// itself or has an `only` descendant.
    ///
    /// 遍历整棵已声明的树一次，标记自身带 `only` 或拥有 `only` 后代的节点。
    pub fn plan(root: &TestNode) -> Self {
        Self {
            only_active: mark_only_paths(root),
        }
    }

    /// Whether `child` is enumerated. `in_only_scope` is true when the parent or
    /// an ancestor is itself `only`-marked, which admits the whole subtree.
    pub fn admits(&self, child: &TestNode, in_only_scope: bool) -> bool {
        !self.only_active || in_only_scope || child.only() || child.on_only_path()
    }

    /// Children of a node that take part in the run, in declaration order.
    pub fn select(&self, children: Vec<TestNode>, in_only_scope: bool) -> Vec<TestNode> {
        children
            .into_iter()
            .filter(|child| {
                let admitted = self.admits(child, in_only_scope);
                if !admitted {
                    tracing::debug!(name = %child.name(), "excluded by only filter");
                }
                admitted
            })
            .collect()
    }
}

fn mark_only_paths(node: &TestNode) -> bool {
    let mut found = false;
    for child in node.children() {
        let below = mark_only_paths(&child);
        child.set_on_only_path(child.only() || below);
        found |= child.only() || below;
    }
    found
}
