//! Behavior Tree Engine.
//!
//! Every node implements [`BehaviorNode`]: one required `tick` that takes a
//! [`TickContext`] and returns a [`NodeStatus`].  The context carries the
//! blackboard, the trace buffer, and the per-call flags a node may need, so
//! composites, decorators and leaves all share one signature.
//!
//! # Composites
//!
//! | Node type    | Description                                                      |
//! |--------------|------------------------------------------------------------------|
//! | [`Sequence`] | Ticks children left-to-right; stops on the first non-success.    |
//! | [`Selector`] | Ticks children left-to-right; stops on the first non-failure.    |
//! | [`Leaf`]     | Executes an arbitrary closure and returns its status.            |
//!
//! A priority composite is a [`Selector`] built with [`Selector::priority`];
//! its children are expected to be supplied highest priority first.
//!
//! Composites keep no memory between ticks: a sequence that returned
//! [`NodeStatus::Running`] starts again from its first child on the next tick.
//!
//! # Example
//!
//! ```rust
//! use roomba_runtime::behavior_tree::{BehaviorNode, Leaf, Sequence, TickContext};
//! use roomba_runtime::{Blackboard, Trace};
//! use roomba_types::{BlackboardInit, NodeStatus};
//!
//! let tree = Sequence::new(vec![
//!     Box::new(Leaf::new("step_a", |_| NodeStatus::Success)),
//!     Box::new(Leaf::new("step_b", |_| NodeStatus::Success)),
//! ]);
//!
//! let init = BlackboardInit { battery_level: 50, spot: false, general: false };
//! let mut bb = Blackboard::new(init, false);
//! let mut trace = Trace::new();
//! let mut ctx = TickContext::new(&mut bb, &mut trace);
//! assert_eq!(tree.tick(&mut ctx), NodeStatus::Success);
//! ```

pub use roomba_types::NodeStatus;

use crate::blackboard::Blackboard;
use crate::trace::Trace;

// ─────────────────────────────────────────────────────────────────────────────
// TickContext
// ─────────────────────────────────────────────────────────────────────────────

/// Everything a node may touch during one tick.
pub struct TickContext<'a> {
    pub blackboard: &'a mut Blackboard,
    pub trace: &'a mut Trace,
    /// Set while the node is ticked inside an open timer window.  Leaves that
    /// honour it report [`NodeStatus::Running`] until the window expires.
    pub timed_window: bool,
    /// Distance from the root of the tree.
    pub depth: usize,
}

impl<'a> TickContext<'a> {
    /// A root-level context with the timed-window flag cleared.
    pub fn new(blackboard: &'a mut Blackboard, trace: &'a mut Trace) -> Self {
        Self { blackboard, trace, timed_window: false, depth: 0 }
    }

    /// Reborrow this context for a child one level deeper, inheriting the
    /// timed-window flag.
    pub fn child(&mut self) -> TickContext<'_> {
        let timed_window = self.timed_window;
        self.child_with(timed_window)
    }

    /// Reborrow this context for a child one level deeper with an explicit
    /// timed-window flag.
    pub fn child_with(&mut self, timed_window: bool) -> TickContext<'_> {
        TickContext {
            blackboard: &mut *self.blackboard,
            trace: &mut *self.trace,
            timed_window,
            depth: self.depth + 1,
        }
    }

    /// Record a result for `node` at this depth and return it.
    pub fn report(&mut self, node: &str, message: impl Into<String>, status: NodeStatus) -> NodeStatus {
        self.trace.outcome(self.depth, node, message, status);
        status
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BehaviorNode
// ─────────────────────────────────────────────────────────────────────────────

/// A node in a behavior tree.
pub trait BehaviorNode: Send + Sync {
    /// Label used in the trace.
    fn label(&self) -> &str;

    /// Tick this node, executing its logic and returning the resulting
    /// [`NodeStatus`].
    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus;
}

/// Owned, type-erased node.
pub type BoxedNode = Box<dyn BehaviorNode>;

// ─────────────────────────────────────────────────────────────────────────────
// Leaf
// ─────────────────────────────────────────────────────────────────────────────

type LeafAction = Box<dyn Fn(&mut TickContext<'_>) -> NodeStatus + Send + Sync>;

/// Leaf backed by a closure.
pub struct Leaf {
    name: String,
    action: LeafAction,
}

impl Leaf {
    /// `action` is called exactly once per [`tick`][BehaviorNode::tick].
    pub fn new(
        name: impl Into<String>,
        action: impl Fn(&mut TickContext<'_>) -> NodeStatus + Send + Sync + 'static,
    ) -> Self {
        Self { name: name.into(), action: Box::new(action) }
    }
}

impl BehaviorNode for Leaf {
    fn label(&self) -> &str {
        &self.name
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let status = (self.action)(ctx);
        ctx.report(&self.name, status.to_string(), status)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequence
// ─────────────────────────────────────────────────────────────────────────────

/// Composite with AND semantics.
///
/// Returns the first child result that is not [`NodeStatus::Success`], or
/// success when every child succeeds.  An empty sequence succeeds.
pub struct Sequence {
    name: String,
    children: Vec<BoxedNode>,
}

impl Sequence {
    pub fn new(children: Vec<BoxedNode>) -> Self {
        Self::named("Sequence", children)
    }

    pub fn named(name: impl Into<String>, children: Vec<BoxedNode>) -> Self {
        Self { name: name.into(), children }
    }
}

impl BehaviorNode for Sequence {
    fn label(&self) -> &str {
        &self.name
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let slot = ctx.trace.open(ctx.depth, &self.name);
        for (index, child) in self.children.iter().enumerate() {
            match child.tick(&mut ctx.child()) {
                NodeStatus::Success => continue,
                other => {
                    let verb = if other == NodeStatus::Failure { "failed" } else { "running" };
                    ctx.trace.close(slot, format!("{verb} at child {index} ({})", child.label()), other);
                    return other;
                }
            }
        }
        ctx.trace.close(slot, "succeeded", NodeStatus::Success);
        NodeStatus::Success
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Selector
// ─────────────────────────────────────────────────────────────────────────────

/// Composite with OR semantics.
///
/// Returns the first child result that is not [`NodeStatus::Failure`], or
/// failure when every child fails.  An empty selector fails.
pub struct Selector {
    name: String,
    children: Vec<BoxedNode>,
}

impl Selector {
    pub fn new(children: Vec<BoxedNode>) -> Self {
        Self::named("Selector", children)
    }

    pub fn named(name: impl Into<String>, children: Vec<BoxedNode>) -> Self {
        Self { name: name.into(), children }
    }

    /// A selector whose children are listed in descending priority.
    ///
    /// Evaluation is identical to [`Selector::new`]; list order is the only
    /// priority mechanism and children are never re-sorted.
    pub fn priority(children: Vec<BoxedNode>) -> Self {
        Self::named("Priority", children)
    }
}

impl BehaviorNode for Selector {
    fn label(&self) -> &str {
        &self.name
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let slot = ctx.trace.open(ctx.depth, &self.name);
        for (index, child) in self.children.iter().enumerate() {
            match child.tick(&mut ctx.child()) {
                NodeStatus::Failure => continue,
                other => {
                    let verb = if other == NodeStatus::Success { "succeeded" } else { "running" };
                    ctx.trace.close(slot, format!("{verb} at child {index} ({})", child.label()), other);
                    return other;
                }
            }
        }
        ctx.trace.close(slot, "failed", NodeStatus::Failure);
        NodeStatus::Failure
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use roomba_types::BlackboardInit;

    use super::*;

    pub(crate) fn blackboard(battery_level: u8) -> Blackboard {
        Blackboard::new(BlackboardInit { battery_level, spot: false, general: false }, false)
    }

    pub(crate) fn tick_once(node: &dyn BehaviorNode, bb: &mut Blackboard) -> NodeStatus {
        let mut trace = Trace::new();
        node.tick(&mut TickContext::new(bb, &mut trace))
    }

    /// A leaf returning `status` that counts how often it was ticked.
    pub(crate) fn counted(name: &str, status: NodeStatus) -> (BoxedNode, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = hits.clone();
        let leaf = Leaf::new(name, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            status
        });
        (Box::new(leaf), hits)
    }

    fn leaf(status: NodeStatus) -> BoxedNode {
        Box::new(Leaf::new("leaf", move |_| status))
    }

    #[test]
    fn leaf_returns_its_status() {
        let mut bb = blackboard(50);
        for status in [NodeStatus::Success, NodeStatus::Failure, NodeStatus::Running] {
            assert_eq!(tick_once(leaf(status).as_ref(), &mut bb), status);
        }
    }

    #[test]
    fn sequence_succeeds_when_all_children_succeed() {
        let tree = Sequence::new(vec![
            leaf(NodeStatus::Success),
            leaf(NodeStatus::Success),
            leaf(NodeStatus::Success),
        ]);
        assert_eq!(tick_once(&tree, &mut blackboard(50)), NodeStatus::Success);
    }

    #[test]
    fn sequence_stops_at_first_failure() {
        let (after, hits) = counted("after", NodeStatus::Success);
        let tree = Sequence::new(vec![leaf(NodeStatus::Success), leaf(NodeStatus::Failure), after]);
        assert_eq!(tick_once(&tree, &mut blackboard(50)), NodeStatus::Failure);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sequence_stops_at_running() {
        let (after, hits) = counted("after", NodeStatus::Success);
        let tree = Sequence::new(vec![leaf(NodeStatus::Success), leaf(NodeStatus::Running), after]);
        assert_eq!(tick_once(&tree, &mut blackboard(50)), NodeStatus::Running);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sequence_restarts_from_first_child_after_running() {
        let (first, hits) = counted("first", NodeStatus::Success);
        let tree = Sequence::new(vec![first, leaf(NodeStatus::Running)]);
        let mut bb = blackboard(50);
        tick_once(&tree, &mut bb);
        tick_once(&tree, &mut bb);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn sequence_empty_succeeds() {
        let tree = Sequence::new(vec![]);
        assert_eq!(tick_once(&tree, &mut blackboard(50)), NodeStatus::Success);
    }

    #[test]
    fn selector_stops_at_first_success() {
        let (after, hits) = counted("after", NodeStatus::Failure);
        let tree = Selector::new(vec![leaf(NodeStatus::Failure), leaf(NodeStatus::Success), after]);
        assert_eq!(tick_once(&tree, &mut blackboard(50)), NodeStatus::Success);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn selector_fails_when_all_children_fail() {
        let tree = Selector::new(vec![leaf(NodeStatus::Failure), leaf(NodeStatus::Failure)]);
        assert_eq!(tick_once(&tree, &mut blackboard(50)), NodeStatus::Failure);
    }

    #[test]
    fn selector_propagates_running() {
        let (after, hits) = counted("after", NodeStatus::Success);
        let tree = Selector::new(vec![leaf(NodeStatus::Failure), leaf(NodeStatus::Running), after]);
        assert_eq!(tick_once(&tree, &mut blackboard(50)), NodeStatus::Running);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn selector_empty_fails() {
        let tree = Selector::new(vec![]);
        assert_eq!(tick_once(&tree, &mut blackboard(50)), NodeStatus::Failure);
    }

    #[test]
    fn priority_tries_children_in_list_order() {
        let (high, high_hits) = counted("high", NodeStatus::Failure);
        let (mid, mid_hits) = counted("mid", NodeStatus::Success);
        let (low, low_hits) = counted("low", NodeStatus::Success);
        let tree = Selector::priority(vec![high, mid, low]);

        assert_eq!(tree.label(), "Priority");
        assert_eq!(tick_once(&tree, &mut blackboard(50)), NodeStatus::Success);
        assert_eq!(high_hits.load(Ordering::SeqCst), 1);
        assert_eq!(mid_hits.load(Ordering::SeqCst), 1);
        assert_eq!(low_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn nested_sequence_in_selector() {
        let tree = Selector::new(vec![
            Box::new(Sequence::new(vec![leaf(NodeStatus::Success), leaf(NodeStatus::Failure)])),
            Box::new(Sequence::new(vec![leaf(NodeStatus::Success), leaf(NodeStatus::Success)])),
        ]);
        assert_eq!(tick_once(&tree, &mut blackboard(50)), NodeStatus::Success);
    }

    #[test]
    fn leaf_side_effects_are_visible_to_later_siblings() {
        let tree = Sequence::new(vec![
            Box::new(Leaf::new("drain", |ctx| {
                ctx.blackboard.decrement_battery(10);
                NodeStatus::Success
            })),
            Box::new(Leaf::new("check", |ctx| {
                if ctx.blackboard.battery_level == 40 { NodeStatus::Success } else { NodeStatus::Failure }
            })),
        ]);
        assert_eq!(tick_once(&tree, &mut blackboard(50)), NodeStatus::Success);
    }

    #[test]
    fn trace_is_pre_order_with_depth() {
        let tree = Sequence::named("root", vec![Box::new(Leaf::new("child", |_| NodeStatus::Success))]);
        let mut bb = blackboard(50);
        let mut trace = Trace::new();
        tree.tick(&mut TickContext::new(&mut bb, &mut trace));

        let lines = trace.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].node.as_str(), lines[0].depth), ("root", 0));
        assert_eq!((lines[1].node.as_str(), lines[1].depth), ("child", 1));
        assert_eq!(lines[0].status, Some(NodeStatus::Success));
    }

    #[test]
    fn child_context_inherits_timed_window() {
        let mut bb = blackboard(50);
        let mut trace = Trace::new();
        let mut ctx = TickContext::new(&mut bb, &mut trace);
        let mut timed = ctx.child_with(true);
        assert!(timed.timed_window);
        let grandchild = timed.child();
        assert!(grandchild.timed_window);
        assert_eq!(grandchild.depth, 2);
    }
}
