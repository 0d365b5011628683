//! Decorators – nodes that own exactly one child and transform or re-invoke
//! its result.
//!
//! | Node                | Behaviour                                                        |
//! |---------------------|------------------------------------------------------------------|
//! | [`LogicalNegation`] | Swaps success and failure; running passes through unchanged.     |
//! | [`UntilFail`]       | Re-ticks the child, draining one battery unit per pass, until it fails. |
//! | [`Timer`]           | Holds the child inside a window of N ticks on the shared timer slot. |

use tracing::{debug, warn};

use crate::behavior_tree::{BehaviorNode, BoxedNode, NodeStatus, TickContext};

// ─────────────────────────────────────────────────────────────────────────────
// LogicalNegation
// ─────────────────────────────────────────────────────────────────────────────

/// Inverts a terminal child result.
pub struct LogicalNegation {
    child: BoxedNode,
}

impl LogicalNegation {
    pub fn new(child: BoxedNode) -> Self {
        Self { child }
    }
}

impl BehaviorNode for LogicalNegation {
    fn label(&self) -> &str {
        "LogicalNegation"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let slot = ctx.trace.open(ctx.depth, self.label());
        let (status, message) = match self.child.tick(&mut ctx.child()) {
            NodeStatus::Success => (NodeStatus::Failure, "child succeeded, returning failure"),
            NodeStatus::Failure => (NodeStatus::Success, "child failed, returning success"),
            NodeStatus::Running => (NodeStatus::Running, "child running, passing through"),
        };
        ctx.trace.close(slot, message, status);
        status
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UntilFail
// ─────────────────────────────────────────────────────────────────────────────

/// Re-ticks its child until the child fails, then returns
/// [`NodeStatus::Failure`].
///
/// Each success or running pass counts as one cycle of work and drains one
/// unit of battery before the child is ticked again.  The loop is iterative,
/// so stack depth does not grow with the number of passes.
///
/// Without a bound the only exit is the child failing.  With
/// [`UntilFail::with_max_iterations`] the decorator gives up after that many
/// drained passes and returns [`NodeStatus::Running`], handing control back to
/// the control loop which will tick it again.
pub struct UntilFail {
    child: BoxedNode,
    max_iterations: Option<u64>,
}

impl UntilFail {
    pub fn new(child: BoxedNode) -> Self {
        Self { child, max_iterations: None }
    }

    /// Bound the number of drained passes per tick.
    pub fn with_max_iterations(mut self, max_iterations: Option<u64>) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl BehaviorNode for UntilFail {
    fn label(&self) -> &str {
        "UntilFail"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let slot = ctx.trace.open(ctx.depth, self.label());
        let mut passes: u64 = 0;
        loop {
            if self.child.tick(&mut ctx.child()) == NodeStatus::Failure {
                ctx.trace.close(slot, format!("child failed after {passes} passes"), NodeStatus::Failure);
                return NodeStatus::Failure;
            }

            ctx.blackboard.decrement_battery(1);
            passes += 1;
            debug!(passes, battery = ctx.blackboard.battery_level, "until-fail pass complete");

            if self.max_iterations.is_some_and(|max| passes >= max) {
                warn!(passes, "until-fail iteration bound reached; yielding RUNNING");
                ctx.trace.close(slot, format!("iteration bound reached after {passes} passes"), NodeStatus::Running);
                return NodeStatus::Running;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer
// ─────────────────────────────────────────────────────────────────────────────

/// Keeps its child inside a window of `duration` ticks.
///
/// The window lives in the blackboard's single [`TimerSlot`][crate::TimerSlot]:
///
/// 1. If the slot is idle a window of `duration` ticks is opened and noted
///    in the trace.
/// 2. On ticks before the last one the child is ticked with
///    `timed_window = true`.  A failing child closes the window and the
///    failure is returned; otherwise `elapsed` advances and the child's
///    result is returned.
/// 3. The last tick of the window closes it and ticks the child one final
///    time with `timed_window = false`, returning that result.
///
/// Starting from an idle slot, a child that never fails therefore sees
/// `duration - 1` timed ticks followed by one untimed tick.
///
/// A timer ticked while another timer's window is open joins that window
/// (and its limit) rather than opening its own.
pub struct Timer {
    name: String,
    child: BoxedNode,
    duration: u32,
}

impl Timer {
    /// `duration` is clamped to at least one tick.
    pub fn new(child: BoxedNode, duration: u32) -> Self {
        Self::named("Timer", child, duration)
    }

    pub fn named(name: impl Into<String>, child: BoxedNode, duration: u32) -> Self {
        Self { name: name.into(), child, duration: duration.max(1) }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }
}

impl BehaviorNode for Timer {
    fn label(&self) -> &str {
        &self.name
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let slot = ctx.trace.open(ctx.depth, &self.name);

        let timer = &mut ctx.blackboard.timer;
        if !timer.is_active() {
            timer.start(self.duration, &self.name);
            ctx.trace.note(ctx.depth, &self.name, format!("starting timer for {} ticks", self.duration));
        } else if timer.owner.as_deref() != Some(self.name.as_str()) {
            warn!(
                timer = %self.name,
                owner = ?timer.owner,
                "timer slot already held by another timer; sharing its window"
            );
        }

        if timer.elapsed + 1 >= timer.limit {
            timer.clear();
            let status = self.child.tick(&mut ctx.child_with(false));
            ctx.trace.close(slot, "window expired", status);
            return status;
        }

        let status = self.child.tick(&mut ctx.child_with(true));
        let timer = &mut ctx.blackboard.timer;
        if status == NodeStatus::Failure {
            timer.clear();
            ctx.trace.close(slot, "child failed, window aborted", NodeStatus::Failure);
            return NodeStatus::Failure;
        }

        timer.elapsed += 1;
        let remaining = timer.remaining();
        ctx.trace.close(slot, format!("{remaining} ticks remaining"), status);
        status
    }
}
