//! Playback controller: the live-follow / scrub state machine.
//!
//! The controller owns the [`PointIndex`] and the selection. It is driven by
//! two inputs only: full point-list updates from the feed and explicit user
//! interactions (track click, drag, key steps). Every mutating call reports
//! whether the selected point changed, and the optional listener is invoked at
//! most once per call.

use super::drag::{CaptureScope, DragGuard};
use super::index::{PointIndex, PointKey};
use super::point::TimelinePoint;

/// What happens to the playhead after the user has scrubbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowPolicy {
    /// Once scrubbed, new points never move the playhead until the point set
    /// is emptied or the user explicitly jumps back to live.
    #[default]
    Sticky,
    /// Landing a scrub on the newest point resumes live-follow.
    ResumeAtLiveEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Unchanged,
    Changed,
}

impl SelectionChange {
    pub fn is_changed(self) -> bool {
        matches!(self, SelectionChange::Changed)
    }
}

type SelectionListener = Box<dyn FnMut(Option<&TimelinePoint>)>;

pub struct PlaybackController {
    index: PointIndex,
    current_index: Option<usize>,
    current_time: Option<f64>,
    is_live: bool,
    /// Sticky: set by any explicit interaction, cleared only by an empty
    /// update, a reset, or an explicit jump to live.
    manually_positioned: bool,
    policy: FollowPolicy,
    drag: Option<DragGuard>,
    /// Last selection handed to the listener. `None` until the first
    /// notification so the initial "no selection" is still announced.
    announced: Option<Option<PointKey>>,
    listener: Option<SelectionListener>,
}

impl PlaybackController {
    pub fn new(policy: FollowPolicy) -> Self {
        Self {
            index: PointIndex::new(),
            current_index: None,
            current_time: None,
            is_live: true,
            manually_positioned: false,
            policy,
            drag: None,
            announced: None,
            listener: None,
        }
    }

    /// Register the selection-changed listener, replacing any previous one
    pub fn on_selection_change(&mut self, listener: impl FnMut(Option<&TimelinePoint>) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn policy(&self) -> FollowPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: FollowPolicy) {
        self.policy = policy;
    }

    pub fn index(&self) -> &PointIndex {
        &self.index
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_time(&self) -> Option<f64> {
        self.current_time
    }

    pub fn current_point(&self) -> Option<&TimelinePoint> {
        self.current_index.and_then(|i| self.index.get(i))
    }

    pub fn current_key(&self) -> Option<PointKey> {
        self.current_index.and_then(|i| self.index.key_of(i))
    }

    pub fn is_live(&self) -> bool {
        self.is_live
    }

    pub fn is_manually_positioned(&self) -> bool {
        self.manually_positioned
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Ingest a full point list from the feed.
    pub fn update(&mut self, points: &[TimelinePoint]) -> SelectionChange {
        let held = self.current_key();
        self.index.update(points);

        let Some(newest) = self.index.newest_index() else {
            self.clear_selection();
            return self.announce();
        };

        // A scrubbed playhead stays on the same point, not just the same time
        let target = match (self.manually_positioned, held) {
            (true, Some(key)) => self
                .index
                .position_of(key)
                .or_else(|| self.index.nearest(key.time()))
                .unwrap_or(newest),
            _ => newest,
        };
        self.select(target);
        self.is_live = target == newest;

        tracing::trace!(
            points = self.index.len(),
            selected = target,
            manual = self.manually_positioned,
            "Timeline updated"
        );
        self.announce()
    }

    /// Drop every point and return to the initial state
    pub fn reset(&mut self) -> SelectionChange {
        self.index.clear();
        self.clear_selection();
        self.announced = None;
        self.announce()
    }

    /// Track click: snap to the point nearest `time`
    pub fn scrub_to_time(&mut self, time: f64) -> SelectionChange {
        match self.index.nearest(time) {
            Some(target) => self.commit_manual(target),
            None => SelectionChange::Unchanged,
        }
    }

    /// Track click at a percentage of the track
    pub fn scrub_to_percent(&mut self, percent: f64) -> SelectionChange {
        match self.index.time_at_percent(percent) {
            Some(time) => self.scrub_to_time(time),
            None => SelectionChange::Unchanged,
        }
    }

    /// Start a drag at `time`, grabbing the pointer from `scope`.
    ///
    /// Ignored when there are no points.
    pub fn pointer_down(&mut self, time: f64, scope: &dyn CaptureScope) -> SelectionChange {
        if self.index.is_empty() {
            return SelectionChange::Unchanged;
        }
        self.release_drag();
        self.drag = Some(scope.acquire());
        tracing::debug!(time, "Scrub drag started");
        self.scrub_to_time(time)
    }

    /// Drag motion. No-op unless a drag is in progress.
    pub fn pointer_move(&mut self, time: f64) -> SelectionChange {
        if self.drag.is_none() {
            return SelectionChange::Unchanged;
        }
        self.scrub_to_time(time)
    }

    /// Finish the drag wherever the pointer is. Returns whether a drag ended.
    pub fn pointer_up(&mut self) -> bool {
        self.release_drag()
    }

    /// Abort the drag (focus loss, resize, teardown). The playhead stays where
    /// the drag left it.
    pub fn cancel_drag(&mut self) -> bool {
        self.release_drag()
    }

    /// Arrow-key step by `delta` points
    pub fn step(&mut self, delta: isize) -> SelectionChange {
        let Some(newest) = self.index.newest_index() else {
            return SelectionChange::Unchanged;
        };
        let current = self.current_index.unwrap_or(newest) as isize;
        let target = (current + delta).clamp(0, newest as isize) as usize;
        self.commit_manual(target)
    }

    pub fn jump_to_start(&mut self) -> SelectionChange {
        if self.index.is_empty() {
            return SelectionChange::Unchanged;
        }
        self.commit_manual(0)
    }

    /// Return to the live edge and resume following new points
    pub fn jump_to_live(&mut self) -> SelectionChange {
        let Some(newest) = self.index.newest_index() else {
            return SelectionChange::Unchanged;
        };
        self.manually_positioned = false;
        self.select(newest);
        self.is_live = true;
        tracing::debug!("Resumed live follow");
        self.announce()
    }

    /// Point to preview while hovering `time`, never at or after the playhead
    pub fn hover_preview(&self, time: f64) -> Option<&TimelinePoint> {
        let current = self.current_time?;
        self.index
            .hover_preview(time, current)
            .and_then(|i| self.index.get(i))
    }

    pub fn hover_preview_at_percent(&self, percent: f64) -> Option<&TimelinePoint> {
        self.index
            .time_at_percent(percent)
            .and_then(|time| self.hover_preview(time))
    }

    /// Playhead position on the track in percent
    pub fn percent_of_current(&self) -> Option<f64> {
        self.current_time.map(|t| self.index.percent(t))
    }

    fn commit_manual(&mut self, target: usize) -> SelectionChange {
        self.manually_positioned = true;
        self.select(target);
        self.is_live = Some(target) == self.index.newest_index();
        if self.is_live && self.policy == FollowPolicy::ResumeAtLiveEdge {
            self.manually_positioned = false;
        }
        self.announce()
    }

    fn select(&mut self, index: usize) {
        self.current_index = Some(index);
        self.current_time = self.index.get(index).map(|p| p.time);
    }

    fn clear_selection(&mut self) {
        self.release_drag();
        self.current_index = None;
        self.current_time = None;
        self.is_live = true;
        self.manually_positioned = false;
    }

    fn release_drag(&mut self) -> bool {
        match self.drag.take() {
            Some(guard) => {
                guard.release();
                tracing::debug!("Scrub drag released");
                true
            }
            None => false,
        }
    }

    fn announce(&mut self) -> SelectionChange {
        let key = self.current_key();
        if self.announced == Some(key) {
            return SelectionChange::Unchanged;
        }
        self.announced = Some(key);
        if let Some(listener) = self.listener.as_mut() {
            let point = self.current_index.and_then(|i| self.index.get(i));
            listener(point);
        }
        SelectionChange::Changed
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(FollowPolicy::default())
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("points", &self.index.len())
            .field("current_index", &self.current_index)
            .field("current_time", &self.current_time)
            .field("is_live", &self.is_live)
            .field("manually_positioned", &self.manually_positioned)
            .field("dragging", &self.drag.is_some())
            .finish()
    }
}
