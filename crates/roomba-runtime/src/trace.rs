//! [`Trace`] – the human-readable decision log of a run.
//!
//! Every node ticked appends a [`TraceLine`] describing what it decided; a
//! timer also notes the tick it opens its window.
//! The harness drains the buffer and renders it however it likes; each line
//! is also mirrored to `tracing` at `debug` level.

use std::fmt;

use roomba_types::NodeStatus;
use tracing::debug;

/// A single decision made by a node during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    /// Control-loop tick the line was recorded in (1-based).
    pub tick: u64,
    /// Distance from the root; the root is at depth 0.
    pub depth: usize,
    /// Label of the node that made the decision.
    pub node: String,
    pub message: String,
    /// Result the node returned, when the line reports one.
    pub status: Option<NodeStatus>,
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:indent$}{}: {}", "", self.node, self.message, indent = self.depth * 2)
    }
}

/// Append-only buffer of [`TraceLine`]s.
#[derive(Debug, Default)]
pub struct Trace {
    tick: u64,
    lines: Vec<TraceLine>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of control-loop tick `tick`.
    pub fn begin_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Record a decision that does not carry a result.
    pub fn note(&mut self, depth: usize, node: &str, message: impl Into<String>) {
        self.push(depth, node, message.into(), None);
    }

    /// Record the result a node is about to return.
    pub fn outcome(&mut self, depth: usize, node: &str, message: impl Into<String>, status: NodeStatus) {
        self.push(depth, node, message.into(), Some(status));
    }

    /// Reserve a line for a node whose result is only known after its
    /// children have ticked.  Fill it in with [`Trace::close`].
    pub fn open(&mut self, depth: usize, node: &str) -> usize {
        self.lines.push(TraceLine {
            tick: self.tick,
            depth,
            node: node.to_string(),
            message: String::new(),
            status: None,
        });
        self.lines.len() - 1
    }

    /// Complete a line reserved with [`Trace::open`].
    pub fn close(&mut self, slot: usize, message: impl Into<String>, status: NodeStatus) {
        let tick = self.tick;
        if let Some(line) = self.lines.get_mut(slot) {
            line.message = message.into();
            line.status = Some(status);
            debug!(tick, depth = line.depth, node = %line.node, status = ?status, "{}", line.message);
        }
    }

    fn push(&mut self, depth: usize, node: &str, message: String, status: Option<NodeStatus>) {
        debug!(tick = self.tick, depth, node, status = ?status, "{message}");
        self.lines.push(TraceLine {
            tick: self.tick,
            depth,
            node: node.to_string(),
            message,
            status,
        });
    }

    pub fn lines(&self) -> &[TraceLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Take every buffered line, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<TraceLine> {
        std::mem::take(&mut self.lines)
    }

    /// Lines recorded by nodes whose label equals `node`.
    pub fn by_node<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a TraceLine> + 'a {
        self.lines.iter().filter(move |l| l.node == node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_carry_the_current_tick() {
        let mut trace = Trace::new();
        trace.begin_tick(3);
        trace.note(0, "Priority", "evaluating");
        trace.outcome(1, "Dock", "success", NodeStatus::Success);

        assert_eq!(trace.len(), 2);
        assert!(trace.lines().iter().all(|l| l.tick == 3));
        assert_eq!(trace.lines()[1].status, Some(NodeStatus::Success));
    }

    #[test]
    fn display_indents_by_depth() {
        let mut trace = Trace::new();
        trace.note(2, "CleanSpot", "running");
        assert_eq!(trace.lines()[0].to_string(), "    CleanSpot: running");
    }

    #[test]
    fn open_line_keeps_its_position() {
        let mut trace = Trace::new();
        let slot = trace.open(0, "Sequence");
        trace.outcome(1, "Clean", "success", NodeStatus::Success);
        trace.close(slot, "succeeded", NodeStatus::Success);

        let lines = trace.lines();
        assert_eq!(lines[0].node, "Sequence");
        assert_eq!(lines[0].message, "succeeded");
        assert_eq!(lines[0].status, Some(NodeStatus::Success));
        assert_eq!(lines[1].node, "Clean");
    }

    #[test]
    fn drain_empties_buffer() {
        let mut trace = Trace::new();
        trace.note(0, "a", "x");
        trace.note(0, "b", "y");
        let drained = trace.drain();
        assert_eq!(drained.len(), 2);
        assert!(trace.is_empty());
    }

    #[test]
    fn by_node_filters_on_label() {
        let mut trace = Trace::new();
        trace.note(0, "a", "x");
        trace.note(0, "b", "y");
        trace.note(1, "a", "z");
        assert_eq!(trace.by_node("a").count(), 2);
    }
}
