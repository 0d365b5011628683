//! Task leaves – simulated robot actions.
//!
//! Tasks may mutate the blackboard.  None of them touch real hardware; the
//! outcomes are fixed by the simulation.

use crate::behavior_tree::{BehaviorNode, NodeStatus, TickContext};
use crate::blackboard::DISCOVERED_HOME_PATH;

/// Clears the spot-cleaning request.
pub struct MarkSpotDone;

impl BehaviorNode for MarkSpotDone {
    fn label(&self) -> &str {
        "MarkSpotDone"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        ctx.blackboard.spot = false;
        ctx.report(self.label(), "spot request cleared", NodeStatus::Success)
    }
}

/// Clears the general-cleaning request.
///
/// In compatibility mode it clears the spot request instead.
pub struct MarkGeneralDone {
    legacy: bool,
}

impl MarkGeneralDone {
    pub fn new() -> Self {
        Self { legacy: false }
    }

    /// Compatibility mode: clears the spot flag rather than the general flag.
    pub fn legacy() -> Self {
        Self { legacy: true }
    }
}

impl Default for MarkGeneralDone {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorNode for MarkGeneralDone {
    fn label(&self) -> &str {
        "MarkGeneralDone"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let message = if self.legacy {
            ctx.blackboard.spot = false;
            "spot request cleared (legacy)"
        } else {
            ctx.blackboard.general = false;
            "general request cleared"
        };
        ctx.report(self.label(), message, NodeStatus::Success)
    }
}

/// Locates the dock and stores the path on the blackboard.  Discovery
/// always succeeds in this simulation.
pub struct FindHome;

impl BehaviorNode for FindHome {
    fn label(&self) -> &str {
        "FindHome"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        ctx.blackboard.home_path = Some(DISCOVERED_HOME_PATH.to_string());
        ctx.report(self.label(), "home path found", NodeStatus::Success)
    }
}

/// Drives to the dock.  Succeeds only along the path `FindHome` stored.
pub struct GoHome;

impl BehaviorNode for GoHome {
    fn label(&self) -> &str {
        "GoHome"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        if ctx.blackboard.home_path.as_deref() == Some(DISCOVERED_HOME_PATH) {
            ctx.report(self.label(), "arrived home", NodeStatus::Success)
        } else {
            ctx.report(self.label(), "no usable home path", NodeStatus::Failure)
        }
    }
}

/// Docks and recharges the battery to full instantly.
pub struct Dock;

impl BehaviorNode for Dock {
    fn label(&self) -> &str {
        "Dock"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        ctx.blackboard.recharge();
        ctx.report(self.label(), "docked, battery recharged", NodeStatus::Success)
    }
}

/// Cleans a spot.  Reports [`NodeStatus::Running`] while ticked inside a
/// timed window and succeeds once the window has expired.
pub struct CleanSpot;

impl BehaviorNode for CleanSpot {
    fn label(&self) -> &str {
        "CleanSpot"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        if ctx.timed_window {
            ctx.report(self.label(), "cleaning", NodeStatus::Running)
        } else {
            ctx.report(self.label(), "spot clean", NodeStatus::Success)
        }
    }
}

/// One general cleaning pass.  Always succeeds.
pub struct Clean;

impl BehaviorNode for Clean {
    fn label(&self) -> &str {
        "Clean"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        ctx.report(self.label(), "cleaning pass done", NodeStatus::Success)
    }
}

/// Idle fallback.  Always succeeds.
pub struct DoNothing;

impl BehaviorNode for DoNothing {
    fn label(&self) -> &str {
        "DoNothing"
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        ctx.report(self.label(), "idle", NodeStatus::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Trace;
    use crate::behavior_tree::tests::{blackboard, tick_once};

    #[test]
    fn mark_spot_done_clears_spot() {
        let mut bb = blackboard(50);
        bb.spot = true;
        assert_eq!(tick_once(&MarkSpotDone, &mut bb), NodeStatus::Success);
        assert!(!bb.spot);
    }

    #[test]
    fn mark_general_done_clears_general() {
        let mut bb = blackboard(50);
        bb.spot = true;
        bb.general = true;
        assert_eq!(tick_once(&MarkGeneralDone::new(), &mut bb), NodeStatus::Success);
        assert!(!bb.general);
        assert!(bb.spot);
    }

    #[test]
    fn legacy_mark_general_done_clears_spot() {
        let mut bb = blackboard(50);
        bb.spot = true;
        bb.general = true;
        assert_eq!(tick_once(&MarkGeneralDone::legacy(), &mut bb), NodeStatus::Success);
        assert!(!bb.spot);
        assert!(bb.general);
    }

    #[test]
    fn go_home_needs_found_path() {
        let mut bb = blackboard(20);
        assert_eq!(tick_once(&GoHome, &mut bb), NodeStatus::Failure);
        assert_eq!(tick_once(&FindHome, &mut bb), NodeStatus::Success);
        assert_eq!(bb.home_path.as_deref(), Some(DISCOVERED_HOME_PATH));
        assert_eq!(tick_once(&GoHome, &mut bb), NodeStatus::Success);
    }

    #[test]
    fn go_home_rejects_foreign_path() {
        let mut bb = blackboard(20);
        bb.home_path = Some("somewhere else".to_string());
        assert_eq!(tick_once(&GoHome, &mut bb), NodeStatus::Failure);
    }

    #[test]
    fn dock_recharges() {
        let mut bb = blackboard(5);
        assert_eq!(tick_once(&Dock, &mut bb), NodeStatus::Success);
        assert_eq!(bb.battery_level, 100);
    }

    #[test]
    fn clean_spot_honours_timed_window() {
        let mut bb = blackboard(50);
        let mut trace = Trace::new();
        let mut ctx = TickContext::new(&mut bb, &mut trace);
        assert_eq!(CleanSpot.tick(&mut ctx.child_with(true)), NodeStatus::Running);
        assert_eq!(CleanSpot.tick(&mut ctx.child_with(false)), NodeStatus::Success);
    }

    #[test]
    fn clean_and_do_nothing_always_succeed() {
        let mut bb = blackboard(0);
        let before = bb.clone();
        assert_eq!(tick_once(&Clean, &mut bb), NodeStatus::Success);
        assert_eq!(tick_once(&DoNothing, &mut bb), NodeStatus::Success);
        assert_eq!(bb, before);
    }
}
