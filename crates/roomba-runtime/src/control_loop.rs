//! [`ControlLoop`] – drives a tree until its root resolves.
//!
//! One *tick* is a full traversal from the root.  After every tick the loop
//! drains one unit of battery; it stops as soon as the root reports a
//! terminal status.  The tree is built once and never changes, only the
//! blackboard does.
//!
//! # Example
//!
//! ```rust
//! use roomba_runtime::{Blackboard, ControlLoop, ControlLoopConfig, Trace, TreeConfig};
//! use roomba_types::{BlackboardInit, NodeStatus};
//!
//! let control = ControlLoop::roomba(&TreeConfig::default(), ControlLoopConfig::default());
//! let init = BlackboardInit { battery_level: 20, spot: false, general: false };
//! let mut bb = Blackboard::new(init, false);
//! let mut trace = Trace::new();
//!
//! let report = control.run_once(&mut bb, &mut trace).expect("no tick budget configured");
//! assert_eq!(report.status, NodeStatus::Success);
//! assert_eq!(report.ticks, 1);
//! ```

use rand::Rng;
use roomba_types::{BlackboardInit, NodeStatus, RoombaError, RoombaResult};
use tracing::{debug, info, warn};

use crate::behavior_tree::{BoxedNode, TickContext};
use crate::blackboard::Blackboard;
use crate::roomba_tree::{self, TreeConfig};
use crate::trace::Trace;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration bundle for [`ControlLoop`].
#[derive(Debug, Clone, PartialEq)]
pub struct ControlLoopConfig {
    /// Give up on a run after this many ticks.  `None` runs until the root
    /// resolves.
    pub max_ticks: Option<u64>,
    /// Probability that the dusty-spot sensor reads true after a reset.
    pub dusty_spot_probability: f64,
}

impl Default for ControlLoopConfig {
    fn default() -> Self {
        Self { max_ticks: None, dusty_spot_probability: 0.4 }
    }
}

/// Outcome of [`ControlLoop::run_once`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Terminal status of the root.
    pub status: NodeStatus,
    /// Number of full ticks performed.
    pub ticks: u64,
    /// Battery level after the final drain.
    pub battery_level: u8,
}

// ─────────────────────────────────────────────────────────────────────────────
// ControlLoop
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the tree and ticks it against a caller-supplied blackboard.
pub struct ControlLoop {
    root: BoxedNode,
    config: ControlLoopConfig,
}

impl ControlLoop {
    pub fn new(root: BoxedNode, config: ControlLoopConfig) -> Self {
        Self { root, config }
    }

    /// Control loop over the reference roomba tree.
    pub fn roomba(tree: &TreeConfig, config: ControlLoopConfig) -> Self {
        Self::new(roomba_tree::build(tree), config)
    }

    pub fn config(&self) -> &ControlLoopConfig {
        &self.config
    }

    /// One full traversal followed by one unit of battery drain.
    pub fn tick(&self, blackboard: &mut Blackboard, trace: &mut Trace) -> NodeStatus {
        let status = self.root.tick(&mut TickContext::new(blackboard, trace));
        blackboard.decrement_battery(1);
        debug!(tick = trace.current_tick(), %status, battery = blackboard.battery_level, "tick complete");
        status
    }

    /// Tick until the root reports a terminal status.
    ///
    /// # Errors
    ///
    /// Returns [`RoombaError::TickBudgetExhausted`] when
    /// [`ControlLoopConfig::max_ticks`] is set and the root is still running
    /// after that many ticks.
    pub fn run_once(&self, blackboard: &mut Blackboard, trace: &mut Trace) -> RoombaResult<RunReport> {
        let mut ticks: u64 = 0;
        loop {
            ticks += 1;
            trace.begin_tick(ticks);
            let status = self.tick(blackboard, trace);

            if status.is_terminal() {
                info!(%status, ticks, battery = blackboard.battery_level, "run complete");
                return Ok(RunReport { status, ticks, battery_level: blackboard.battery_level });
            }

            if self.config.max_ticks.is_some_and(|max| ticks >= max) {
                warn!(ticks, "tick budget exhausted while root still running");
                return Err(RoombaError::TickBudgetExhausted { ticks });
            }
        }
    }

    /// Re-seed `blackboard` for another round.
    pub fn reset<R: Rng + ?Sized>(&self, blackboard: &mut Blackboard, init: BlackboardInit, rng: &mut R) {
        blackboard.reset(init, rng, self.config.dusty_spot_probability);
        debug!(?init, dusty_spot = blackboard.dusty_spot, "blackboard reset");
    }
}
