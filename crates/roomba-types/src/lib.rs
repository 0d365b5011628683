//! `roomba-types` – value types shared by the behavior-tree runtime and the
//! console harness.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest battery level a blackboard can be seeded with.
pub const BATTERY_FULL: u8 = 100;

/// The execution status returned by a behavior tree node after a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    /// The node completed its task successfully.
    Success,
    /// The node could not complete its task.
    Failure,
    /// Not yet resolved; tick again on the next control-loop iteration.
    Running,
}

impl NodeStatus {
    /// `true` for [`NodeStatus::Success`] and [`NodeStatus::Failure`].
    pub fn is_terminal(self) -> bool {
        !matches!(self, NodeStatus::Running)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Success => write!(f, "SUCCESS"),
            NodeStatus::Failure => write!(f, "FAILURE"),
            NodeStatus::Running => write!(f, "RUNNING"),
        }
    }
}

/// The blackboard field a condition leaf inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckKey {
    /// Holds while the battery level is below [`CheckKey::LOW_BATTERY_THRESHOLD`].
    BatteryLow,
    /// A localized spill needs cleaning.
    SpotRequested,
    /// A general cleaning pass has been requested.
    GeneralRequested,
    /// The dusty-spot sensor fired.
    DustySpotDetected,
}

impl CheckKey {
    /// Battery levels strictly below this value count as low.
    pub const LOW_BATTERY_THRESHOLD: u8 = 30;

    /// Every key, in declaration order.
    pub const ALL: [CheckKey; 4] = [
        CheckKey::BatteryLow,
        CheckKey::SpotRequested,
        CheckKey::GeneralRequested,
        CheckKey::DustySpotDetected,
    ];
}

impl fmt::Display for CheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckKey::BatteryLow => "BATTERY_LOW",
            CheckKey::SpotRequested => "SPOT_REQUESTED",
            CheckKey::GeneralRequested => "GENERAL_REQUESTED",
            CheckKey::DustySpotDetected => "DUSTY_SPOT_DETECTED",
        };
        f.write_str(s)
    }
}

/// The externally supplied part of a blackboard.
///
/// The dusty-spot sensor is not part of this: it is drawn by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackboardInit {
    pub battery_level: u8,
    pub spot: bool,
    pub general: bool,
}

/// Narrow a raw integer to a battery level in `0..=100`.
pub fn parse_battery_level(raw: i64) -> Result<u8, RoombaError> {
    match u8::try_from(raw) {
        Ok(level) if level <= BATTERY_FULL => Ok(level),
        _ => Err(RoombaError::InvalidBattery(raw)),
    }
}

/// Errors raised outside the tree. Inside the tree FAILURE is the only
/// error signal.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoombaError {
    #[error("battery level {0} is outside 0..=100")]
    InvalidBattery(i64),

    #[error("'{0}' is not an integer battery level")]
    InvalidBatteryInput(String),

    #[error("'{0}' is not a valid flag, expected t or f")]
    InvalidFlag(String),

    #[error("'{0}' is not a valid answer, expected y or n")]
    InvalidAnswer(String),

    #[error("tree still RUNNING after {ticks} ticks")]
    TickBudgetExhausted { ticks: u64 },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type RoombaResult<T> = Result<T, RoombaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_upper_case() {
        let json = serde_json::to_string(&NodeStatus::Running).unwrap();
        assert_eq!(json, "\"RUNNING\"");
        let back: NodeStatus = serde_json::from_str("\"FAILURE\"").unwrap();
        assert_eq!(back, NodeStatus::Failure);
    }

    #[test]
    fn only_running_is_non_terminal() {
        assert!(NodeStatus::Success.is_terminal());
        assert!(NodeStatus::Failure.is_terminal());
        assert!(!NodeStatus::Running.is_terminal());
    }

    #[test]
    fn check_key_display_matches_serde_name() {
        for key in CheckKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{key}\""));
        }
    }

    #[test]
    fn battery_bounds_are_enforced() {
        assert_eq!(parse_battery_level(0), Ok(0));
        assert_eq!(parse_battery_level(100), Ok(100));
        assert_eq!(parse_battery_level(101), Err(RoombaError::InvalidBattery(101)));
        assert_eq!(parse_battery_level(-1), Err(RoombaError::InvalidBattery(-1)));
    }

    #[test]
    fn error_display() {
        let err = RoombaError::TickBudgetExhausted { ticks: 7 };
        assert!(err.to_string().contains("7 ticks"));
        let err = RoombaError::InvalidFlag("maybe".to_string());
        assert!(err.to_string().contains("maybe"));
    }
}
