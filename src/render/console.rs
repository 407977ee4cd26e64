//! Console adapter: feeds the selection into the terminal replay engine.
//!
//! The text buffer only exists while console mode is active. Entering the
//! mode creates and attaches a fresh buffer; leaving it, or dropping the
//! adapter, detaches and frees it.

use crate::replay::{ReplayOutcome, TerminalReplay, TextBuffer};
use crate::timeline::TimelinePoint;

pub struct ConsoleAdapter {
    replay: TerminalReplay<TextBuffer>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            replay: TerminalReplay::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.replay.is_attached()
    }

    /// Create and attach the buffer. Any update received while detached is
    /// replayed in full.
    pub fn enter(&mut self) -> Option<ReplayOutcome> {
        if self.replay.is_attached() {
            return None;
        }
        tracing::debug!("Console surface attached");
        Some(self.replay.attach(TextBuffer::new()))
    }

    /// Detach and drop the buffer
    pub fn leave(&mut self) {
        if self.replay.detach().is_some() {
            tracing::debug!("Console surface released");
        }
    }

    /// Show the console state at `anchor`, the latest console point at or
    /// before the playhead.
    pub fn present(&mut self, anchor: Option<&TimelinePoint>, points: &[TimelinePoint]) -> ReplayOutcome {
        self.replay.apply(anchor, points)
    }

    pub fn buffer(&self) -> Option<&TextBuffer> {
        self.replay.surface()
    }

    pub fn buffer_mut(&mut self) -> Option<&mut TextBuffer> {
        self.replay.surface_mut()
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConsoleAdapter {
    fn drop(&mut self) {
        self.leave();
    }
}
