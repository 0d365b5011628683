//! [`Blackboard`] – the shared world state read and written by leaf nodes.
//!
//! One blackboard lives for one run of the control loop.  It is passed
//! explicitly to every tick through [`TickContext`][crate::TickContext]; there
//! is no global instance.
//!
//! # Timer slot
//!
//! The blackboard holds a **single** [`TimerSlot`].  At most one
//! [`Timer`][crate::decorators::Timer] window can be open at a time: a second
//! timer that ticks while the slot is held joins the open window instead of
//! starting its own.  Nested or concurrent timed windows are not supported.

use rand::Rng;
use roomba_types::{BATTERY_FULL, BlackboardInit, CheckKey};

/// Path reported by [`FindHome`][crate::tasks::FindHome] once the dock has
/// been located.
pub const DISCOVERED_HOME_PATH: &str = "New Home Path";

// ─────────────────────────────────────────────────────────────────────────────
// TimerSlot
// ─────────────────────────────────────────────────────────────────────────────

/// The shared elapsed/limit pair used by timer decorators.
///
/// `(0, 0)` means no window is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerSlot {
    pub elapsed: u32,
    pub limit: u32,
    /// Label of the timer that opened the current window.
    pub owner: Option<String>,
}

impl TimerSlot {
    pub fn is_active(&self) -> bool {
        !(self.elapsed == 0 && self.limit == 0)
    }

    /// Open a window of `limit` ticks on behalf of `owner`.
    pub fn start(&mut self, limit: u32, owner: &str) {
        self.elapsed = 0;
        self.limit = limit;
        self.owner = Some(owner.to_string());
    }

    /// Close the window.
    pub fn clear(&mut self) {
        *self = TimerSlot::default();
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.elapsed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Blackboard
// ─────────────────────────────────────────────────────────────────────────────

/// Shared mutable world state.
#[derive(Debug, Clone, PartialEq)]
pub struct Blackboard {
    /// Charge in `0..=100`.  Decrements saturate at zero.
    pub battery_level: u8,
    /// A localized spill needs cleaning.
    pub spot: bool,
    /// A general cleaning pass is requested.
    pub general: bool,
    /// Dusty-spot sensor reading, drawn at seeding time.
    pub dusty_spot: bool,
    /// Path to the dock; `None` until `FindHome` succeeds.
    pub home_path: Option<String>,
    pub timer: TimerSlot,
}

impl Blackboard {
    /// Build a blackboard with an explicit dusty-spot reading.
    pub fn new(init: BlackboardInit, dusty_spot: bool) -> Self {
        Self {
            battery_level: init.battery_level.min(BATTERY_FULL),
            spot: init.spot,
            general: init.general,
            dusty_spot,
            home_path: None,
            timer: TimerSlot::default(),
        }
    }

    /// Build a blackboard whose dusty-spot sensor reads `true` with
    /// probability `dusty_probability`.
    pub fn seeded<R: Rng + ?Sized>(init: BlackboardInit, rng: &mut R, dusty_probability: f64) -> Self {
        Self::new(init, draw_dusty_spot(rng, dusty_probability))
    }

    /// Re-initialise every field for a new round.
    ///
    /// Clears the home path and the timer slot and redraws the dusty-spot
    /// sensor.
    pub fn reset<R: Rng + ?Sized>(&mut self, init: BlackboardInit, rng: &mut R, dusty_probability: f64) {
        *self = Self::seeded(init, rng, dusty_probability);
    }

    /// Drain `amount` units of charge, stopping at zero.
    pub fn decrement_battery(&mut self, amount: u8) {
        self.battery_level = self.battery_level.saturating_sub(amount);
    }

    /// Instant recharge to full.
    pub fn recharge(&mut self) {
        self.battery_level = BATTERY_FULL;
    }

    /// Evaluate a condition key against the current state.
    pub fn check(&self, key: CheckKey) -> bool {
        match key {
            CheckKey::BatteryLow => self.battery_level < CheckKey::LOW_BATTERY_THRESHOLD,
            CheckKey::SpotRequested => self.spot,
            CheckKey::GeneralRequested => self.general,
            CheckKey::DustySpotDetected => self.dusty_spot,
        }
    }
}

fn draw_dusty_spot<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    // NaN survives `clamp` and would make `gen_bool` panic.
    if probability.is_nan() {
        return false;
    }
    rng.gen_bool(probability.clamp(0.0, 1.0))
}
