//! Depth-bounded tree walks.
//!
//! Both walks are depth-first and pre-order, use an explicit stack rather
//! than recursion, and never descend below `max_depth`. By default they skip
//! `ERROR` subtrees entirely; malformed-document recovery opts back in with
//! `include_error_nodes`.

use std::ops::ControlFlow;

use crate::document::node::NodeRef;

/// Default depth cap for walks.
pub const DEFAULT_MAX_DEPTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraverseOptions {
    pub max_depth: usize,
    pub include_error_nodes: bool,
    pub stop_on_first_match: bool,
}

impl Default for TraverseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            include_error_nodes: false,
            stop_on_first_match: false,
        }
    }
}

impl TraverseOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn including_errors(mut self) -> Self {
        self.include_error_nodes = true;
        self
    }

    pub fn first_match_only(mut self) -> Self {
        self.stop_on_first_match = true;
        self
    }
}

/// Collects every node under `root` (inclusive) that satisfies `predicate`,
/// in document order.
pub fn traverse<F>(root: &NodeRef, mut predicate: F, options: TraverseOptions) -> Vec<NodeRef>
where
    F: FnMut(&NodeRef) -> bool,
{
    let mut matches = Vec::new();
    let mut stack = vec![(root.clone(), 0usize)];

    while let Some((node, depth)) = stack.pop() {
        if node.is_error() && !options.include_error_nodes {
            continue;
        }
        if predicate(&node) {
            matches.push(node.clone());
            if options.stop_on_first_match {
                break;
            }
        }
        if depth < options.max_depth {
            stack.extend(node.children().rev().map(|child| (child, depth + 1)));
        }
    }

    matches
}

/// Walks `root` carrying a context value down the tree.
///
/// Every child's context is derived from its parent's with `build`; `visit`
/// sees each node with its context and may return `ControlFlow::Break` to end
/// the whole walk at once.
pub fn traverse_with_context<C, B, V>(
    root: &NodeRef,
    initial: C,
    mut build: B,
    mut visit: V,
    options: TraverseOptions,
) where
    B: FnMut(&NodeRef, &C) -> C,
    V: FnMut(&NodeRef, &C) -> ControlFlow<()>,
{
    let mut stack = vec![(root.clone(), initial, 0usize)];

    while let Some((node, context, depth)) = stack.pop() {
        if node.is_error() && !options.include_error_nodes {
            continue;
        }
        if visit(&node, &context).is_break() {
            return;
        }
        if depth < options.max_depth {
            for child in node.children().rev() {
                let child_context = build(&child, &context);
                stack.push((child, child_context, depth + 1));
            }
        }
    }
}
