//! Depth-first, pre-order traversal shared by every scan.
//!
//! A visitor decides what happens at a node (record something, list its
//! children, prune); the walker owns ordering, the depth guard and the stack.
//! An explicit stack is used so arbitrarily deep trees cannot exhaust the
//! call stack.

use crate::domain::models::NamespacePath;
use crate::vault::{list_keys, TransportError, VaultApi};

/// Outcome of handling one node.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<N> {
    /// Recurse into these children, in this order.
    Descend(Vec<N>),
    /// Do not look below this node.
    Prune,
}

pub trait TreeVisitor {
    type Node;

    fn handle(&mut self, node: &Self::Node, depth: usize) -> Step<Self::Node>;

    /// Called instead of descending when `children` would exceed the depth
    /// guard.
    fn depth_limited(&mut self, _node: &Self::Node, _children: usize) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WalkLimits {
    /// Deepest depth (root = 0) whose nodes are still handled.
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub nodes: usize,
    pub pruned: usize,
}

pub fn walk<V: TreeVisitor>(visitor: &mut V, root: V::Node, limits: WalkLimits) -> WalkStats {
    let mut stats = WalkStats::default();
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        stats.nodes += 1;
        match visitor.handle(&node, depth) {
            Step::Prune => stats.pruned += 1,
            Step::Descend(children) => {
                if children.is_empty() {
                    continue;
                }
                if limits.max_depth.is_some_and(|max| depth >= max) {
                    visitor.depth_limited(&node, children.len());
                    continue;
                }
                // Reverse so the first child is popped first.
                stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
            }
        }
    }
    stats
}

/// Visits every namespace reachable from `root`, listing children with
/// `LIST sys/namespaces` scoped to the namespace being expanded. Namespaces
/// at the depth guard are visited but never listed.
struct NamespaceVisitor<'a, F> {
    api: &'a dyn VaultApi,
    max_depth: Option<usize>,
    visit: F,
}

impl<F: FnMut(&NamespacePath)> TreeVisitor for NamespaceVisitor<'_, F> {
    type Node = NamespacePath;

    fn handle(&mut self, ns: &NamespacePath, depth: usize) -> Step<NamespacePath> {
        (self.visit)(ns);
        if self.max_depth.is_some_and(|max| depth >= max) {
            tracing::warn!(
                namespace = %ns.label(),
                depth,
                "max depth reached, child namespaces not listed"
            );
            return Step::Descend(vec![]);
        }
        match list_keys(self.api, "sys/namespaces", ns) {
            Ok(keys) => Step::Descend(keys.iter().map(|k| ns.child(k)).collect()),
            Err(e @ TransportError::Unreachable(_)) => {
                tracing::warn!(namespace = %ns.label(), error = %e, "cannot list child namespaces");
                Step::Descend(vec![])
            }
            Err(e) => {
                tracing::debug!(namespace = %ns.label(), error = %e, "namespaces not listable here");
                Step::Descend(vec![])
            }
        }
    }
}

pub fn walk_namespaces(
    api: &dyn VaultApi,
    root: NamespacePath,
    limits: WalkLimits,
    visit: impl FnMut(&NamespacePath),
) -> WalkStats {
    let mut visitor = NamespaceVisitor {
        api,
        max_depth: limits.max_depth,
        visit,
    };
    walk(&mut visitor, root, limits)
}
