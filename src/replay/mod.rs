//! Terminal replay engine.
//!
//! Rebuilds the console output for the selected point from console chunks that
//! share its session. Moving forward within a session only appends the new
//! chunks; switching session or rewinding clears the surface and replays the
//! session from its first chunk.

pub mod buffer;

pub use buffer::TextBuffer;

use crate::timeline::TimelinePoint;

/// Anything that can show an append-only stream of console text
pub trait ReplaySurface {
    /// Drop all content
    fn reset(&mut self);
    /// Append raw text at the end
    fn append(&mut self, text: &str);
    /// Whether the view currently shows the last line
    fn is_at_bottom(&self) -> bool;
    fn scroll_to_bottom(&mut self);
}

/// What an [`TerminalReplay::apply`] call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// No point selected or no points at all
    Cleared,
    /// Surface cleared and the session replayed from the start
    Reset { chunks: usize },
    /// Only chunks newer than the previous position were appended
    Incremental { chunks: usize },
    /// Same session and time as the last update
    Unchanged,
    /// No surface attached; the request is kept for the next attach
    Deferred,
}

/// Position the surface content currently reflects
#[derive(Debug, Clone, PartialEq)]
struct ReplayCursor {
    session_id: Option<String>,
    time: f64,
    /// Session chunks at or before `time` when the surface was last written
    chunks: usize,
}

/// Request remembered while detached
#[derive(Debug, Clone)]
enum Pending {
    Clear,
    Replay {
        current: TimelinePoint,
        session: Vec<TimelinePoint>,
    },
}

pub struct TerminalReplay<S: ReplaySurface> {
    surface: Option<S>,
    cursor: Option<ReplayCursor>,
    pending: Option<Pending>,
}

impl<S: ReplaySurface> TerminalReplay<S> {
    /// Engine without a surface; updates are deferred until [`attach`](Self::attach)
    pub fn new() -> Self {
        Self {
            surface: None,
            cursor: None,
            pending: None,
        }
    }

    pub fn with_surface(surface: S) -> Self {
        Self {
            surface: Some(surface),
            cursor: None,
            pending: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Attach a surface and redo the last deferred request in full
    pub fn attach(&mut self, surface: S) -> ReplayOutcome {
        self.surface = Some(surface);
        self.cursor = None;
        match self.pending.take() {
            Some(Pending::Clear) | None => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.reset();
                }
                ReplayOutcome::Cleared
            }
            Some(Pending::Replay { current, session }) => self.apply(Some(&current), &session),
        }
    }

    /// Take the surface away. The next attach starts from a clean replay.
    pub fn detach(&mut self) -> Option<S> {
        self.cursor = None;
        self.pending = None;
        self.surface.take()
    }

    /// Bring the surface in line with `current`.
    ///
    /// `points` may contain other sessions; only chunks sharing the current
    /// point's `session_id` are replayed. Points are expected in time order,
    /// as produced by the point index.
    pub fn apply(&mut self, current: Option<&TimelinePoint>, points: &[TimelinePoint]) -> ReplayOutcome {
        let Some(surface) = self.surface.as_mut() else {
            self.pending = Some(match current {
                Some(current) if !points.is_empty() => Pending::Replay {
                    current: current.clone(),
                    session: same_session(points, current).cloned().collect(),
                },
                _ => Pending::Clear,
            });
            tracing::debug!("Console surface not attached, deferring replay");
            return ReplayOutcome::Deferred;
        };

        let current = match current {
            Some(current) if !points.is_empty() => current,
            _ => {
                surface.reset();
                self.cursor = None;
                return ReplayOutcome::Cleared;
            }
        };

        let next = ReplayCursor {
            session_id: current.session_id.clone(),
            time: current.time,
            chunks: chunks_through(points, current, current.time),
        };
        let was_at_bottom = surface.is_at_bottom();

        // A chunk that arrived late behind the cursor forces a full replay
        let in_step = |prev: &ReplayCursor| {
            prev.session_id == next.session_id
                && chunks_through(points, current, prev.time) == prev.chunks
        };

        let outcome = match &self.cursor {
            Some(prev) if in_step(prev) && next.time == prev.time => {
                return ReplayOutcome::Unchanged;
            }
            Some(prev) if in_step(prev) && next.time > prev.time => {
                let chunks = append_chunks(
                    surface,
                    same_session(points, current).filter(|p| p.time > prev.time && p.time <= next.time),
                );
                ReplayOutcome::Incremental { chunks }
            }
            _ => {
                surface.reset();
                let chunks = append_chunks(
                    surface,
                    same_session(points, current).filter(|p| p.time <= next.time),
                );
                ReplayOutcome::Reset { chunks }
            }
        };

        if was_at_bottom {
            surface.scroll_to_bottom();
        }
        tracing::trace!(
            session = ?next.session_id,
            time = next.time,
            outcome = ?outcome,
            "Console replayed"
        );
        self.cursor = Some(next);
        outcome
    }
}

impl<S: ReplaySurface> Default for TerminalReplay<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn same_session<'a>(
    points: &'a [TimelinePoint],
    current: &'a TimelinePoint,
) -> impl Iterator<Item = &'a TimelinePoint> + 'a {
    points
        .iter()
        .filter(move |p| p.session_id == current.session_id)
}

fn chunks_through(points: &[TimelinePoint], current: &TimelinePoint, time: f64) -> usize {
    same_session(points, current)
        .filter(|p| p.time <= time && p.text.is_some())
        .count()
}

fn append_chunks<'a, S: ReplaySurface>(
    surface: &mut S,
    points: impl Iterator<Item = &'a TimelinePoint>,
) -> usize {
    let mut chunks = 0;
    for text in points.filter_map(|p| p.text.as_deref()) {
        surface.append(text);
        chunks += 1;
    }
    chunks
}
