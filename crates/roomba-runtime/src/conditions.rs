//! [`Condition`] – read-only leaf that checks one blackboard field.

use roomba_types::CheckKey;

use crate::behavior_tree::{BehaviorNode, NodeStatus, TickContext};

/// Returns [`NodeStatus::Success`] when `key` holds on the blackboard and
/// [`NodeStatus::Failure`] otherwise.  Never running, never mutates state.
pub struct Condition {
    key: CheckKey,
    name: String,
}

impl Condition {
    pub fn new(key: CheckKey) -> Self {
        Self { key, name: format!("Condition({key})") }
    }
}

impl BehaviorNode for Condition {
    fn label(&self) -> &str {
        &self.name
    }

    fn tick(&self, ctx: &mut TickContext<'_>) -> NodeStatus {
        let holds = ctx.blackboard.check(self.key);
        let message = match self.key {
            CheckKey::BatteryLow => format!(
                "battery {}% is {} {}%",
                ctx.blackboard.battery_level,
                if holds { "below" } else { "at or above" },
                CheckKey::LOW_BATTERY_THRESHOLD
            ),
            _ => holds.to_string(),
        };
        let status = if holds { NodeStatus::Success } else { NodeStatus::Failure };
        ctx.report(&self.name, message, status)
    }
}
