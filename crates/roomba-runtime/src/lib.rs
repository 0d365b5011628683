//! `roomba-runtime` – the behavior-tree engine behind the roomba simulator.
//!
//! # Modules
//!
//! - [`behavior_tree`] – the [`BehaviorNode`] capability, [`TickContext`],
//!   closure-backed [`Leaf`][behavior_tree::Leaf] nodes and the
//!   [`Sequence`][behavior_tree::Sequence] / [`Selector`][behavior_tree::Selector]
//!   composites (a priority composite is a selector whose children are
//!   listed highest priority first).
//! - [`decorators`] – [`LogicalNegation`][decorators::LogicalNegation],
//!   [`UntilFail`][decorators::UntilFail] and [`Timer`][decorators::Timer].
//! - [`conditions`] – the read-only [`Condition`][conditions::Condition] leaf.
//! - [`tasks`] – simulated actions: cleaning, finding and going home,
//!   docking.
//! - [`blackboard`] – [`Blackboard`], the shared world state, with its single
//!   [`TimerSlot`].
//! - [`trace`] – [`Trace`], the per-node decision log handed to the harness.
//! - [`roomba_tree`] – builds the reference roomba tree from a
//!   [`TreeConfig`].
//! - [`control_loop`] – [`ControlLoop`]: ticks the root until it resolves,
//!   draining one battery unit per tick.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing].
//!
//! Execution is single-threaded and synchronous.  The blackboard is passed
//! explicitly into every tick; nothing is global.

pub mod behavior_tree;
pub mod blackboard;
pub mod conditions;
pub mod control_loop;
pub mod decorators;
pub mod roomba_tree;
pub mod tasks;
pub mod telemetry;
pub mod trace;

pub use behavior_tree::{BehaviorNode, BoxedNode, NodeStatus, TickContext};
pub use blackboard::{Blackboard, TimerSlot};
pub use control_loop::{ControlLoop, ControlLoopConfig, RunReport};
pub use roomba_tree::TreeConfig;
pub use telemetry::init_tracing;
pub use trace::{Trace, TraceLine};
