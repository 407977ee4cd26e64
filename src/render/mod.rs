//! Renderer adapters and the presenter that routes the selection to them.
//!
//! Adapters only read the point index; the controller stays the single owner
//! of the selection.

pub mod console;
pub mod frame;
pub mod image;
pub mod proposals;

pub use console::ConsoleAdapter;
pub use frame::{FrameAdapter, FrameGeometry, SmoothScroll};
pub use self::image::{load_image, ImageError, ImageKey, ImageSlot, LoadRequest, SlotState};
pub use proposals::ProposalAdapter;

use std::fmt;
use std::sync::Arc;

use ::image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::timeline::{PlaybackController, PointKind, TimelinePoint};

/// Which adapter shows the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Pick by the kind of the selected point
    #[default]
    Auto,
    Frame,
    Console,
    Proposals,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderMode::Auto => "auto",
            RenderMode::Frame => "frame",
            RenderMode::Console => "console",
            RenderMode::Proposals => "proposals",
        };
        write!(f, "{name}")
    }
}

/// Adapter currently on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Frame,
    Console,
    Proposals,
}

impl ActiveView {
    fn for_point(point: Option<&TimelinePoint>) -> Self {
        match point.and_then(TimelinePoint::kind) {
            Some(PointKind::Proposals) => ActiveView::Proposals,
            Some(PointKind::Console) => ActiveView::Console,
            Some(PointKind::Frame) | None => ActiveView::Frame,
        }
    }
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActiveView::Frame => "frame",
            ActiveView::Console => "console",
            ActiveView::Proposals => "proposals",
        };
        write!(f, "{name}")
    }
}

pub struct Presenter {
    mode: RenderMode,
    active: ActiveView,
    frame: FrameAdapter,
    console: ConsoleAdapter,
    proposals: ProposalAdapter,
}

impl Presenter {
    pub fn new(mode: RenderMode, smooth_scroll_steps: u32) -> Self {
        Self {
            mode,
            active: ActiveView::Frame,
            frame: FrameAdapter::new(smooth_scroll_steps),
            console: ConsoleAdapter::new(),
            proposals: ProposalAdapter::new(),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn active(&self) -> ActiveView {
        self.active
    }

    /// Switch modes and re-present the current selection
    pub fn set_mode(&mut self, mode: RenderMode, controller: &PlaybackController) -> Option<LoadRequest> {
        if self.mode != mode {
            tracing::debug!(from = %self.mode, to = %mode, "Render mode changed");
            self.mode = mode;
        }
        self.present(controller)
    }

    /// Hand the controller's selection to the active adapter. Returns the
    /// image the host has to load, if any.
    pub fn present(&mut self, controller: &PlaybackController) -> Option<LoadRequest> {
        let point = controller.current_point();
        let key = controller.current_key();

        self.active = match self.mode {
            RenderMode::Auto => ActiveView::for_point(point),
            RenderMode::Frame => ActiveView::Frame,
            RenderMode::Console => ActiveView::Console,
            RenderMode::Proposals => ActiveView::Proposals,
        };

        if self.active != ActiveView::Console {
            self.console.leave();
        }

        match self.active {
            ActiveView::Frame => self.frame.select(key, point),
            ActiveView::Proposals => self.proposals.select(key, point),
            ActiveView::Console => {
                self.console.enter();
                let points = controller.index().points();
                let anchor = controller
                    .current_index()
                    .and_then(|i| points.get(..=i))
                    .and_then(|head| head.iter().rev().find(|p| p.is_console()));
                let outcome = self.console.present(anchor, points);
                tracing::trace!(?outcome, "Console presented");
                None
            }
        }
    }

    /// Route a finished image load to the adapter that asked for it
    pub fn on_image_loaded(&mut self, key: ImageKey, result: Result<Arc<DynamicImage>, ImageError>) {
        if key.is_frame() {
            self.frame.on_image_loaded(key, result);
        } else {
            self.proposals.on_image_loaded(key, result);
        }
    }

    pub fn next_proposal(&mut self) -> Option<LoadRequest> {
        if self.active != ActiveView::Proposals {
            return None;
        }
        self.proposals.next()
    }

    pub fn prev_proposal(&mut self) -> Option<LoadRequest> {
        if self.active != ActiveView::Proposals {
            return None;
        }
        self.proposals.prev()
    }

    /// Advance animations. Returns whether anything moved.
    pub fn tick(&mut self) -> bool {
        self.frame.tick()
    }

    pub fn frame(&self) -> &FrameAdapter {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut FrameAdapter {
        &mut self.frame
    }

    pub fn console(&self) -> &ConsoleAdapter {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut ConsoleAdapter {
        &mut self.console
    }

    pub fn proposals(&self) -> &ProposalAdapter {
        &self.proposals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{FollowPolicy, ImageRef};

    fn mixed_points() -> Vec<TimelinePoint> {
        vec![
            TimelinePoint::console(0.0, "s", "one\n"),
            TimelinePoint::frame(1.0, ImageRef::path("f1.png")),
            TimelinePoint::console(2.0, "s", "two\n"),
            TimelinePoint::at(3.0).with_proposals(vec![ImageRef::path("p.png")]),
        ]
    }

    fn controller(points: &[TimelinePoint]) -> PlaybackController {
        let mut controller = PlaybackController::new(FollowPolicy::Sticky);
        controller.update(points);
        controller
    }

    #[test]
    fn auto_mode_follows_point_kind() {
        let points = mixed_points();
        let mut controller = controller(&points);
        let mut presenter = Presenter::new(RenderMode::Auto, 0);

        let request = presenter.present(&controller).unwrap();
        assert_eq!(presenter.active(), ActiveView::Proposals);
        assert!(!request.key.is_frame());

        controller.scrub_to_time(2.0);
        assert!(presenter.present(&controller).is_none());
        assert_eq!(presenter.active(), ActiveView::Console);
        assert_eq!(presenter.console().buffer().unwrap().contents(), "one\ntwo\n");

        controller.scrub_to_time(1.0);
        let request = presenter.present(&controller).unwrap();
        assert_eq!(presenter.active(), ActiveView::Frame);
        assert!(request.key.is_frame());
        assert!(presenter.console().buffer().is_none());
    }

    #[test]
    fn forced_console_mode_anchors_on_earlier_chunk() {
        let points = mixed_points();
        let mut controller = controller(&points);
        controller.scrub_to_time(1.0);
        let mut presenter = Presenter::new(RenderMode::Console, 0);
        presenter.present(&controller);
        assert_eq!(presenter.console().buffer().unwrap().contents(), "one\n");
    }

    #[test]
    fn image_results_route_by_slot() {
        let points = mixed_points();
        let mut controller = controller(&points);
        controller.scrub_to_time(1.0);
        let mut presenter = Presenter::new(RenderMode::Auto, 0);
        let request = presenter.present(&controller).unwrap();
        presenter.on_image_loaded(request.key, Ok(super::image::tests::solid_image(4, 4)));
        assert!(presenter.frame().image().is_some());
        assert!(presenter.proposals().slot().image().is_none());
    }

    #[test]
    fn proposal_navigation_only_in_proposal_view() {
        let points = mixed_points();
        let controller = controller(&points);
        let mut presenter = Presenter::new(RenderMode::Frame, 0);
        presenter.present(&controller);
        assert!(presenter.next_proposal().is_none());
        presenter.set_mode(RenderMode::Proposals, &controller);
        assert_eq!(presenter.active(), ActiveView::Proposals);
        assert_eq!(presenter.proposals().proposals().len(), 1);
    }

    #[test]
    fn mode_names_round_trip_through_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: RenderMode,
        }
        let parsed: Wrapper = toml::from_str("mode = \"console\"").unwrap();
        assert_eq!(parsed.mode, RenderMode::Console);
        assert_eq!(RenderMode::Proposals.to_string(), "proposals");
    }
}
