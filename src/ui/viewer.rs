//! Viewer state: the playback engine plus everything the terminal host needs
//! to draw it and route input to it. Nothing here touches the real terminal,
//! so it can be driven from tests with a `TestBackend`.

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use image::DynamicImage;
use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    Frame,
};

use crate::config::Config;
use crate::feed::FeedUpdate;
use crate::render::{ActiveView, ImageError, ImageKey, LoadRequest, Presenter, RenderMode};
use crate::replay::ReplaySurface;
use crate::timeline::{PlaybackController, PointerGrab, SelectionChange};
use crate::ui::action::Action;
use crate::ui::components::{
    footer_hints, format_time, frame_geometry, percent_at_column, render_key_hints, theme,
    truncate_to_width, ConsoleView, FrameView, HelpDialog, HelpDialogState, KeyHintBarStyle,
    ProposalView, ScrubTrack, StatusBar,
};

/// Rows moved per mouse wheel notch
const WHEEL_ROWS: usize = 3;

pub struct Viewer {
    config: Config,
    controller: PlaybackController,
    presenter: Presenter,
    grab: PointerGrab,
    help: HelpDialogState,
    /// Tape name for the header
    source: Option<String>,
    /// Hovered track position in percent
    hover: Option<f64>,
    track_area: Rect,
    content_area: Rect,
    pending_loads: Vec<LoadRequest>,
    should_quit: bool,
}

impl Viewer {
    pub fn new(config: Config, mode: RenderMode) -> Self {
        let mut controller = PlaybackController::new(config.playback.follow_policy());
        controller.on_selection_change(|point| match point {
            Some(point) => tracing::debug!(time = point.time, "Selection changed"),
            None => tracing::debug!("Selection cleared"),
        });
        let presenter = Presenter::new(mode, config.playback.smooth_scroll_steps);
        Self {
            config,
            controller,
            presenter,
            grab: PointerGrab::new(),
            help: HelpDialogState::new(),
            source: None,
            hover: None,
            track_area: Rect::default(),
            content_area: Rect::default(),
            pending_loads: Vec::new(),
            should_quit: false,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn is_help_visible(&self) -> bool {
        self.help.is_visible()
    }

    pub fn hover(&self) -> Option<f64> {
        self.hover
    }

    /// Image loads requested since the last call
    pub fn take_load_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.pending_loads)
    }

    pub fn apply_feed(&mut self, update: FeedUpdate) {
        let change = match update {
            FeedUpdate::Points(points) => {
                tracing::debug!(count = points.len(), "Feed update");
                self.controller.update(&points)
            }
            FeedUpdate::Reset => {
                tracing::info!("Feed reset");
                self.hover = None;
                self.controller.reset()
            }
        };
        // Console text may have arrived behind an unchanged playhead
        if !change.is_changed() && self.presenter.active() == ActiveView::Console {
            self.presenter.present(&self.controller);
            return;
        }
        self.after(change);
    }

    pub fn on_image_loaded(&mut self, key: ImageKey, result: Result<Arc<DynamicImage>, ImageError>) {
        if let Err(e) = &result {
            tracing::warn!(?key, error = %e, "Image load failed");
        }
        self.presenter.on_image_loaded(key, result);
    }

    /// Advance animations. Returns whether a redraw is needed.
    pub fn tick(&mut self) -> bool {
        self.presenter.tick()
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(_, _) | Event::FocusLost => {
                if self.controller.cancel_drag() {
                    tracing::debug!("Scrub drag cancelled");
                }
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let action = self.config.keybindings.action_for(key);
        if self.help.is_visible() {
            self.handle_help_key(key, action);
            return;
        }
        if let Some(action) = action {
            self.perform(action);
        }
    }

    fn handle_help_key(&mut self, key: &KeyEvent, action: Option<Action>) {
        match action {
            Some(Action::Quit) => self.should_quit = true,
            Some(Action::ScrollUp) => self.help.scroll_up(1),
            Some(Action::ScrollDown) => self.help.scroll_down(1),
            Some(Action::ScrollPageUp) => self.help.scroll_up(self.page_rows()),
            Some(Action::ScrollPageDown) => self.help.scroll_down(self.page_rows()),
            Some(Action::ToggleHelp) => self.help.hide(),
            _ if key.code == KeyCode::Esc => self.help.hide(),
            _ => {}
        }
    }

    pub fn perform(&mut self, action: Action) {
        let step = self.config.playback.step_size as isize;
        let change = match action {
            Action::Quit => {
                self.should_quit = true;
                SelectionChange::Unchanged
            }
            Action::ToggleHelp => {
                self.help.show(&self.config.keybindings);
                SelectionChange::Unchanged
            }
            Action::StepBack => self.controller.step(-1),
            Action::StepForward => self.controller.step(1),
            Action::StepBackMany => self.controller.step(-step),
            Action::StepForwardMany => self.controller.step(step),
            Action::JumpToStart => self.controller.jump_to_start(),
            Action::JumpToLive => self.controller.jump_to_live(),
            Action::CycleRenderMode => {
                let next = next_mode(self.presenter.mode());
                let request = self.presenter.set_mode(next, &self.controller);
                self.pending_loads.extend(request);
                SelectionChange::Unchanged
            }
            Action::NextProposal => {
                let request = self.presenter.next_proposal();
                self.pending_loads.extend(request);
                SelectionChange::Unchanged
            }
            Action::PrevProposal => {
                let request = self.presenter.prev_proposal();
                self.pending_loads.extend(request);
                SelectionChange::Unchanged
            }
            Action::ScrollUp => self.scroll(Scroll::Up(1)),
            Action::ScrollDown => self.scroll(Scroll::Down(1)),
            Action::ScrollPageUp => self.scroll(Scroll::Up(self.page_rows())),
            Action::ScrollPageDown => self.scroll(Scroll::Down(self.page_rows())),
            Action::ScrollToTop => self.scroll(Scroll::Top),
            Action::ScrollToBottom => self.scroll(Scroll::Bottom),
        };
        self.after(change);
    }

    pub fn handle_mouse(&mut self, mouse: &MouseEvent) {
        let position = Position::new(mouse.column, mouse.row);
        let on_track = self.track_area.contains(position);
        let change = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if on_track => {
                match self.time_at_column(mouse.column) {
                    Some(time) => self.controller.pointer_down(time, &self.grab),
                    None => SelectionChange::Unchanged,
                }
            }
            // While grabbed, motion anywhere on screen drives the scrub.
            MouseEventKind::Drag(MouseButton::Left) if self.grab.is_grabbed() => {
                self.hover = None;
                match self.time_at_column(mouse.column) {
                    Some(time) => self.controller.pointer_move(time),
                    None => SelectionChange::Unchanged,
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.controller.pointer_up();
                SelectionChange::Unchanged
            }
            MouseEventKind::Moved => {
                self.hover = on_track.then(|| percent_at_column(self.track_area, mouse.column));
                SelectionChange::Unchanged
            }
            MouseEventKind::ScrollUp if self.content_area.contains(position) => {
                self.scroll(Scroll::Up(WHEEL_ROWS))
            }
            MouseEventKind::ScrollDown if self.content_area.contains(position) => {
                self.scroll(Scroll::Down(WHEEL_ROWS))
            }
            _ => SelectionChange::Unchanged,
        };
        self.after(change);
    }

    fn time_at_column(&self, column: u16) -> Option<f64> {
        self.controller
            .index()
            .time_at_percent(percent_at_column(self.track_area, column))
    }

    fn page_rows(&self) -> usize {
        (self.content_area.height as usize).saturating_sub(1).max(1)
    }

    fn scroll(&mut self, scroll: Scroll) -> SelectionChange {
        match self.presenter.active() {
            ActiveView::Console => {
                if let Some(buffer) = self.presenter.console_mut().buffer_mut() {
                    match scroll {
                        Scroll::Up(n) => buffer.scroll_up(n),
                        Scroll::Down(n) => buffer.scroll_down(n),
                        Scroll::Top => buffer.scroll_to_top(),
                        Scroll::Bottom => buffer.scroll_to_bottom(),
                    }
                }
            }
            ActiveView::Frame => {
                // Two image pixels per terminal row
                let delta = match scroll {
                    Scroll::Up(n) => -(n as f64) * 2.0,
                    Scroll::Down(n) => n as f64 * 2.0,
                    Scroll::Top => f64::MIN,
                    Scroll::Bottom => f64::MAX,
                };
                self.presenter.frame_mut().scroll_by(delta);
            }
            ActiveView::Proposals => {}
        }
        SelectionChange::Unchanged
    }

    /// Re-present after the selection moved
    fn after(&mut self, change: SelectionChange) {
        if change.is_changed() {
            let request = self.presenter.present(&self.controller);
            self.pending_loads.extend(request);
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        let [header, content, hover, track, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(area);
        self.content_area = content;
        self.track_area = Rect::new(track.x, track.y, track.width, 1);

        f.render_widget(
            StatusBar::new(&self.controller, self.presenter.mode(), self.presenter.active())
                .source(self.source.as_deref()),
            header,
        );

        match self.presenter.active() {
            ActiveView::Frame => {
                self.presenter.frame_mut().set_container(frame_geometry(content));
                let location = self
                    .controller
                    .current_point()
                    .map(|p| p.location.as_str());
                f.render_widget(
                    FrameView::new(self.presenter.frame()).location(location),
                    content,
                );
            }
            ActiveView::Console => {
                if let Some(buffer) = self.presenter.console_mut().buffer_mut() {
                    buffer.set_viewport_height(content.height as usize);
                }
                f.render_widget(ConsoleView::new(self.presenter.console().buffer()), content);
            }
            ActiveView::Proposals => {
                f.render_widget(ProposalView::new(self.presenter.proposals()), content);
            }
        }

        if let Some(line) = self.hover_line(hover.width) {
            f.render_widget(line, hover);
        }
        f.render_widget(ScrubTrack::new(&self.controller).hover(self.hover), track);

        let hints = footer_hints(&self.config.keybindings);
        render_key_hints(footer, f.buffer_mut(), &hints, KeyHintBarStyle::footer_bar());

        HelpDialog::new().render(area, f.buffer_mut(), &mut self.help);
    }

    fn hover_line(&self, width: u16) -> Option<Line<'static>> {
        let point = self.controller.hover_preview_at_percent(self.hover?)?;
        let mut text = format!("◂ {}", format_time(point.time));
        if !point.location.is_empty() {
            text.push_str("  ");
            text.push_str(&point.location);
        }
        if let Some(image) = point.preview_image() {
            text.push_str("  ");
            text.push_str(&image.label());
        }
        Some(Line::from(Span::styled(
            truncate_to_width(&text, width as usize),
            Style::default().fg(theme::ACCENT),
        )))
    }
}

#[derive(Debug, Clone, Copy)]
enum Scroll {
    Up(usize),
    Down(usize),
    Top,
    Bottom,
}

fn next_mode(mode: RenderMode) -> RenderMode {
    match mode {
        RenderMode::Auto => RenderMode::Frame,
        RenderMode::Frame => RenderMode::Console,
        RenderMode::Console => RenderMode::Proposals,
        RenderMode::Proposals => RenderMode::Auto,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TimelinePoint;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn points(n: usize) -> Vec<TimelinePoint> {
        (0..n).map(|i| TimelinePoint::at(i as f64)).collect()
    }

    #[test]
    fn keys_step_through_points() {
        let mut viewer = Viewer::new(Config::default(), RenderMode::Auto);
        viewer.apply_feed(FeedUpdate::Points(points(5)));
        assert_eq!(viewer.controller().current_index(), Some(4));

        viewer.handle_key(&key(KeyCode::Left));
        viewer.handle_key(&key(KeyCode::Char('h')));
        assert_eq!(viewer.controller().current_index(), Some(2));
        assert!(!viewer.controller().is_live());

        viewer.handle_key(&key(KeyCode::End));
        assert!(viewer.controller().is_live());
        assert!(!viewer.controller().is_manually_positioned());
    }

    #[test]
    fn late_console_chunk_shows_behind_scrubbed_playhead() {
        let mut viewer = Viewer::new(Config::default(), RenderMode::Console);
        viewer.apply_feed(FeedUpdate::Points(vec![
            TimelinePoint::console(0.0, "s", "a"),
            TimelinePoint::console(2.0, "s", "c"),
        ]));
        viewer.handle_key(&key(KeyCode::Left));
        viewer.handle_key(&key(KeyCode::Right));
        assert!(viewer.controller().is_manually_positioned());

        viewer.apply_feed(FeedUpdate::Points(vec![
            TimelinePoint::console(0.0, "s", "a"),
            TimelinePoint::console(2.0, "s", "c"),
            TimelinePoint::console(1.0, "s", "b"),
        ]));
        assert_eq!(viewer.controller().current_time(), Some(2.0));
        let buffer = viewer.presenter().console().buffer().unwrap();
        assert_eq!(buffer.contents(), "abc");
    }

    #[test]
    fn many_step_uses_configured_size() {
        let mut config = Config::default();
        config.playback.step_size = 3;
        let mut viewer = Viewer::new(config, RenderMode::Auto);
        viewer.apply_feed(FeedUpdate::Points(points(10)));
        viewer.perform(Action::StepBackMany);
        assert_eq!(viewer.controller().current_index(), Some(6));
    }

    #[test]
    fn mode_cycles_through_all_views() {
        let mut viewer = Viewer::new(Config::default(), RenderMode::Auto);
        let mut seen = Vec::new();
        for _ in 0..4 {
            viewer.perform(Action::CycleRenderMode);
            seen.push(viewer.presenter().mode());
        }
        assert_eq!(
            seen,
            vec![
                RenderMode::Frame,
                RenderMode::Console,
                RenderMode::Proposals,
                RenderMode::Auto
            ]
        );
    }

    #[test]
    fn help_swallows_playback_keys() {
        let mut viewer = Viewer::new(Config::default(), RenderMode::Auto);
        viewer.apply_feed(FeedUpdate::Points(points(3)));
        viewer.handle_key(&key(KeyCode::Char('?')));
        assert!(viewer.is_help_visible());

        viewer.handle_key(&key(KeyCode::Left));
        assert_eq!(viewer.controller().current_index(), Some(2));

        viewer.handle_key(&key(KeyCode::Esc));
        assert!(!viewer.is_help_visible());
        assert!(!viewer.should_quit());
    }

    #[test]
    fn reset_clears_selection() {
        let mut viewer = Viewer::new(Config::default(), RenderMode::Auto);
        viewer.apply_feed(FeedUpdate::Points(points(3)));
        viewer.apply_feed(FeedUpdate::Reset);
        assert_eq!(viewer.controller().current_index(), None);
        assert!(viewer.controller().is_live());
    }

    #[test]
    fn frame_selection_requests_image_once() {
        let mut viewer = Viewer::new(Config::default(), RenderMode::Auto);
        let point = TimelinePoint::frame(1.0, crate::timeline::ImageRef::path("a.png"));
        viewer.apply_feed(FeedUpdate::Points(vec![point.clone()]));
        let requests = viewer.take_load_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].key.is_frame());

        viewer.apply_feed(FeedUpdate::Points(vec![point]));
        assert!(viewer.take_load_requests().is_empty());
    }
}
