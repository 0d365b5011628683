//! The roomba's reference behavior tree.
//!
//! ```text
//! Priority
//! ├── Sequence [battery]      low battery → find home → go home → dock
//! ├── Selector [cleaning]
//! │   ├── Sequence [spot]     spot requested → Timer(CleanSpot) → mark done
//! │   └── Sequence [general]  general requested →
//! │       └── Sequence            UntilFail(not low battery → dusty spot
//! │                               cleaning or a plain pass) → mark done
//! └── DoNothing
//! ```

use roomba_types::CheckKey;

use crate::behavior_tree::{BoxedNode, Selector, Sequence};
use crate::conditions::Condition;
use crate::decorators::{LogicalNegation, Timer, UntilFail};
use crate::tasks::{Clean, CleanSpot, Dock, DoNothing, FindHome, GoHome, MarkGeneralDone, MarkSpotDone};

/// Tunables for [`build`].
#[derive(Debug, Clone, PartialEq)]
pub struct TreeConfig {
    /// Window length of the spot-cleaning timer.
    pub spot_clean_ticks: u32,
    /// Window length of the dusty-spot timer inside the general pass.
    pub dusty_clean_ticks: u32,
    /// Bound on drained passes of the general-cleaning loop per tick.
    pub until_fail_max_iterations: Option<u64>,
    /// Clear the spot flag, not the general flag, when general cleaning ends.
    pub legacy_general_done: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            spot_clean_ticks: 20,
            dusty_clean_ticks: 35,
            until_fail_max_iterations: None,
            legacy_general_done: false,
        }
    }
}

/// Build the reference tree.
pub fn build(config: &TreeConfig) -> BoxedNode {
    Box::new(Selector::priority(vec![
        battery_branch(),
        Box::new(Selector::named(
            "Selector[cleaning]",
            vec![spot_branch(config), general_branch(config)],
        )),
        Box::new(DoNothing),
    ]))
}

fn condition(key: CheckKey) -> BoxedNode {
    Box::new(Condition::new(key))
}

fn battery_branch() -> BoxedNode {
    Box::new(Sequence::named(
        "Sequence[battery]",
        vec![
            condition(CheckKey::BatteryLow),
            Box::new(FindHome),
            Box::new(GoHome),
            Box::new(Dock),
        ],
    ))
}

fn spot_branch(config: &TreeConfig) -> BoxedNode {
    Box::new(Sequence::named(
        "Sequence[spot]",
        vec![
            condition(CheckKey::SpotRequested),
            Box::new(Timer::named("Timer[spot]", Box::new(CleanSpot), config.spot_clean_ticks)),
            Box::new(MarkSpotDone),
        ],
    ))
}

fn general_branch(config: &TreeConfig) -> BoxedNode {
    let dusty = Sequence::named(
        "Sequence[dusty]",
        vec![
            condition(CheckKey::DustySpotDetected),
            Box::new(Timer::named("Timer[dusty]", Box::new(CleanSpot), config.dusty_clean_ticks)),
        ],
    );
    let pass = Sequence::named(
        "Sequence[pass]",
        vec![
            Box::new(LogicalNegation::new(condition(CheckKey::BatteryLow))),
            Box::new(Selector::new(vec![Box::new(dusty), Box::new(Clean)])),
        ],
    );
    let until_fail = UntilFail::new(Box::new(pass)).with_max_iterations(config.until_fail_max_iterations);
    let done: BoxedNode = if config.legacy_general_done {
        Box::new(MarkGeneralDone::legacy())
    } else {
        Box::new(MarkGeneralDone::new())
    };

    Box::new(Sequence::named(
        "Sequence[general]",
        vec![
            condition(CheckKey::GeneralRequested),
            Box::new(Sequence::new(vec![Box::new(until_fail), done])),
        ],
    ))
}
