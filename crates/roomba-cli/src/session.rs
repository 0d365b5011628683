//! Session – the interactive round loop around the engine.
//!
//! A round asks for the initial battery level and the two cleaning requests,
//! runs the tree until it resolves, prints the decision trace, then asks
//! whether to go again.  Invalid answers are rejected and asked again; they
//! never reach the engine.

use colored::Colorize;
use rand::Rng;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use roomba_runtime::{Blackboard, ControlLoop, NodeStatus, RunReport, Trace, TraceLine};
use roomba_types::{BlackboardInit, RoombaError, RoombaResult, parse_battery_level};
use tracing::{info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Answer parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse an initial battery level in `0..=100`.
pub fn parse_battery(raw: &str) -> RoombaResult<u8> {
    let raw = raw.trim();
    let value: i64 = raw.parse().map_err(|_| RoombaError::InvalidBatteryInput(raw.to_string()))?;
    parse_battery_level(value)
}

/// Parse a `t` / `f` answer, case-insensitively.
pub fn parse_flag(raw: &str) -> RoombaResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "t" => Ok(true),
        "f" => Ok(false),
        other => Err(RoombaError::InvalidFlag(other.to_string())),
    }
}

/// Parse a `y` / `n` answer, case-insensitively.
pub fn parse_yes_no(raw: &str) -> RoombaResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "y" => Ok(true),
        "n" => Ok(false),
        other => Err(RoombaError::InvalidAnswer(other.to_string())),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Console
// ─────────────────────────────────────────────────────────────────────────────

/// Line-oriented prompt/print surface over any reader and writer.
pub struct Console<R, W> {
    input: R,
    output: W,
    shutdown: Option<Arc<AtomicBool>>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, shutdown: None }
    }

    /// Stop asking once `flag` is set.
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    fn shutting_down(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Ask until `parse` accepts the answer.  Returns `None` on EOF, a read
    /// error, or shutdown.
    fn ask<T>(&mut self, msg: &str, parse: impl Fn(&str) -> RoombaResult<T>) -> Option<T> {
        loop {
            write!(self.output, "{msg}").ok();
            self.output.flush().ok();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "failed to read answer");
                    return None;
                }
            }

            if self.shutting_down() {
                return None;
            }
            match parse(&line) {
                Ok(value) => return Some(value),
                Err(e) => {
                    writeln!(self.output, "  {} {e}. Please try again.", "Invalid input:".red()).ok();
                }
            }
        }
    }

    /// Ask for the externally supplied blackboard fields.
    pub fn read_init(&mut self) -> Option<BlackboardInit> {
        writeln!(self.output, "\n{}", "Initializing new blackboard".bold().underline()).ok();
        let battery_level = self.ask("  Battery level (0-100): ", parse_battery)?;
        let spot = self.ask("  Spot cleaning requested (t/f): ", parse_flag)?;
        let general = self.ask("  General cleaning requested (t/f): ", parse_flag)?;
        Some(BlackboardInit { battery_level, spot, general })
    }

    pub fn ask_run_again(&mut self) -> Option<bool> {
        self.ask("Would you like to run the tree again (y/n)? ", parse_yes_no)
    }

    /// Print the decision trace, grouped by tick.
    pub fn render_trace(&mut self, lines: &[TraceLine]) {
        let mut current_tick = 0;
        for line in lines {
            if line.tick != current_tick {
                current_tick = line.tick;
                writeln!(self.output, "{}", format!("── tick {current_tick} ──").dimmed()).ok();
            }
            let status = match line.status {
                Some(status) => format!(" [{}]", paint(status)),
                None => String::new(),
            };
            writeln!(
                self.output,
                "{:indent$}{}: {}{}",
                "",
                line.node.bold(),
                line.message,
                status,
                indent = 2 + line.depth * 2
            )
            .ok();
        }
    }

    pub fn render_report(&mut self, report: &RunReport) {
        writeln!(
            self.output,
            "\n  Tree finished with {} after {} tick(s); battery at {}%.\n",
            paint(report.status),
            report.ticks,
            report.battery_level
        )
        .ok();
    }

    pub fn render_error(&mut self, err: &RoombaError) {
        writeln!(self.output, "\n  {} {err}\n", "Run aborted:".red().bold()).ok();
    }
}

fn paint(status: NodeStatus) -> colored::ColoredString {
    let text = status.to_string();
    match status {
        NodeStatus::Success => text.green().bold(),
        NodeStatus::Failure => text.red().bold(),
        NodeStatus::Running => text.yellow(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Round loop
// ─────────────────────────────────────────────────────────────────────────────

/// Run rounds until the operator declines, stdin closes, or `shutdown` is
/// set.  Returns the number of completed rounds.
///
/// `shutdown` is polled before every prompt; a round that is already being
/// ticked always runs to completion.
pub fn run<R, W, G>(
    console: &mut Console<R, W>,
    control: &ControlLoop,
    rng: &mut G,
    shutdown: &Arc<AtomicBool>,
) -> u32
where
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    let probability = control.config().dusty_spot_probability;
    let Some(init) = console.read_init() else {
        return 0;
    };
    let mut blackboard = Blackboard::seeded(init, rng, probability);
    let mut rounds = 0;

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        let mut trace = Trace::new();
        let result = control.run_once(&mut blackboard, &mut trace);
        console.render_trace(&trace.drain());
        match result {
            Ok(report) => console.render_report(&report),
            Err(e) => console.render_error(&e),
        }
        rounds += 1;
        info!(rounds, "round complete");

        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match console.ask_run_again() {
            Some(true) => {}
            Some(false) | None => break,
        }
        let Some(init) = console.read_init() else {
            break;
        };
        control.reset(&mut blackboard, init, rng);
    }
    rounds
}
