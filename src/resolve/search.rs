//! Searching for the best node around a point.

use std::collections::{HashSet, VecDeque};

use tree_sitter::Point;

use crate::document::node::NodeRef;

/// Descends from `start` through children containing `point` and returns the
/// deepest node accepted by `accept`.
///
/// At each level the named child containing `point` with the smallest span
/// wins, the first one on ties; anonymous tokens are only followed when no
/// named child contains the point.
pub fn find_most_specific_node<F>(start: &NodeRef, point: Point, accept: F) -> Option<NodeRef>
where
    F: Fn(&NodeRef) -> bool,
{
    let mut best = accept(start).then(|| start.clone());
    let mut current = start.clone();

    while let Some(next) = child_containing(&current, point) {
        if accept(&next) {
            best = Some(next.clone());
        }
        current = next;
    }

    best
}

/// The deepest named node containing `point`, or `root` itself.
pub fn named_descendant_at(root: &NodeRef, point: Point) -> NodeRef {
    find_most_specific_node(root, point, NodeRef::is_named).unwrap_or_else(|| root.clone())
}

fn child_containing(node: &NodeRef, point: Point) -> Option<NodeRef> {
    let smallest = |named: bool| {
        node.children()
            .filter(|child| child.is_named() == named && child.contains(point))
            .fold(None::<NodeRef>, |best, child| match best {
                Some(best) if best.span_len() <= child.span_len() => Some(best),
                _ => Some(child),
            })
    };
    smallest(true).or_else(|| smallest(false))
}

/// Searches outward from `point` for an accepted node strictly smaller than
/// `reference`.
///
/// The search is breadth-first over parent, child and sibling links starting
/// at the deepest node containing `point`, visits each node once and stops
/// after `max_hops` rings. Within the first ring that has candidates, nodes
/// containing `point` win, then the closest, then the smallest.
pub fn find_nearby_node<F>(
    root: &NodeRef,
    point: Point,
    reference: &NodeRef,
    accept: F,
    max_hops: usize,
) -> Option<NodeRef>
where
    F: Fn(&NodeRef) -> bool,
{
    let origin = find_most_specific_node(root, point, |_| true).unwrap_or_else(|| root.clone());
    let limit = reference.span_len();

    let mut seen = HashSet::from([origin.id()]);
    let mut ring = VecDeque::from([origin]);

    for _ in 0..=max_hops {
        let best = ring
            .iter()
            .filter(|node| node.span_len() < limit && accept(node))
            .min_by_key(|node| (!node.contains(point), distance(node, point), node.span_len()));
        if let Some(best) = best {
            return Some(best.clone());
        }

        let mut next = VecDeque::new();
        for node in ring.drain(..) {
            let neighbours = node
                .parent()
                .into_iter()
                .chain(node.prev_sibling())
                .chain(node.next_sibling())
                .chain(node.children());
            for neighbour in neighbours {
                if seen.insert(neighbour.id()) {
                    next.push_back(neighbour);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        ring = next;
    }

    None
}

/// Rows and columns between `point` and the nearest edge of `node`.
fn distance(node: &NodeRef, point: Point) -> (usize, usize) {
    let gap = |a: Point, b: Point| {
        if a.row == b.row {
            (0, a.column.abs_diff(b.column))
        } else {
            (a.row.abs_diff(b.row), b.column)
        }
    };
    if node.contains(point) {
        (0, 0)
    } else if point < node.start() {
        gap(point, node.start())
    } else {
        gap(node.end(), point)
    }
}
