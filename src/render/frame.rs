//! Captured-frame adapter with cursor centering.
//!
//! Frames are laid out at the container width, so the displayed height
//! follows the image aspect ratio. When the selected point carries a cursor,
//! the view scrolls so that the cursor sits in the middle of the container.
//! All lengths are in display pixels.

use std::sync::Arc;

use image::DynamicImage;

use super::image::{ImageError, ImageKey, ImageSlot, LoadRequest};
use crate::timeline::{CursorPos, PointKey, TimelinePoint, Viewport};

/// Size of the area the frame is drawn into
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameGeometry {
    pub width: f64,
    pub height: f64,
}

/// Eased scroll between two offsets, advanced by host ticks
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    from: f64,
    target: f64,
    step: u32,
    steps: u32,
}

impl SmoothScroll {
    pub fn new(steps: u32) -> Self {
        Self {
            from: 0.0,
            target: 0.0,
            step: 0,
            steps,
        }
    }

    pub fn position(&self) -> f64 {
        if self.step >= self.steps {
            return self.target;
        }
        let t = self.step as f64 / self.steps as f64;
        let eased = 1.0 - (1.0 - t).powi(3);
        self.from + (self.target - self.from) * eased
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.step < self.steps
    }

    pub fn animate_to(&mut self, target: f64) {
        self.from = self.position();
        self.target = target;
        self.step = 0;
    }

    pub fn jump_to(&mut self, target: f64) {
        self.from = target;
        self.target = target;
        self.step = self.steps;
    }

    /// Advance one frame. Returns whether the position moved.
    pub fn tick(&mut self) -> bool {
        if !self.is_animating() {
            return false;
        }
        self.step += 1;
        true
    }
}

#[derive(Debug, Clone)]
struct SelectedFrame {
    key: PointKey,
    cursor: Option<CursorPos>,
    viewport: Option<Viewport>,
}

#[derive(Debug)]
pub struct FrameAdapter {
    selected: Option<SelectedFrame>,
    slot: ImageSlot,
    container: FrameGeometry,
    scroll: SmoothScroll,
}

impl FrameAdapter {
    pub fn new(smooth_scroll_steps: u32) -> Self {
        Self {
            selected: None,
            slot: ImageSlot::new(),
            container: FrameGeometry::default(),
            scroll: SmoothScroll::new(smooth_scroll_steps),
        }
    }

    /// Show `point`. Returns a load request when its frame must be decoded.
    pub fn select(&mut self, key: Option<PointKey>, point: Option<&TimelinePoint>) -> Option<LoadRequest> {
        let (Some(key), Some(point)) = (key, point) else {
            self.selected = None;
            self.slot.clear();
            return None;
        };
        let Some(frame) = point.frame.as_ref() else {
            self.selected = None;
            self.slot.clear();
            return None;
        };

        self.selected = Some(SelectedFrame {
            key,
            cursor: point.cursor,
            viewport: point.viewport,
        });
        let request = self.slot.request(ImageKey::frame(key), frame);
        if request.is_none() {
            // Image decoded or in flight; only the cursor may have moved.
            self.recenter();
        }
        request
    }

    /// Finished load from the host. Late results for deselected points are
    /// dropped and failures leave the scroll position alone.
    pub fn on_image_loaded(&mut self, key: ImageKey, result: Result<Arc<DynamicImage>, ImageError>) {
        let current = self.selected.as_ref().map(|s| ImageKey::frame(s.key));
        if current != Some(key) {
            tracing::debug!(?key, "Frame load finished for a point no longer selected");
            return;
        }
        if self.slot.complete(key, result) && self.slot.image().is_some() {
            self.recenter();
        }
    }

    pub fn set_container(&mut self, container: FrameGeometry) {
        if self.container != container {
            self.container = container;
            self.recenter();
        }
    }

    pub fn container(&self) -> FrameGeometry {
        self.container
    }

    pub fn slot(&self) -> &ImageSlot {
        &self.slot
    }

    pub fn image(&self) -> Option<&Arc<DynamicImage>> {
        self.slot.image()
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll.position()
    }

    pub fn scroll_target(&self) -> f64 {
        self.scroll.target()
    }

    pub fn tick(&mut self) -> bool {
        self.scroll.tick()
    }

    /// Manual scroll by the operator
    pub fn scroll_by(&mut self, delta: f64) {
        let target = (self.scroll.target() + delta).clamp(0.0, self.max_scroll());
        self.scroll.jump_to(target);
    }

    /// Height of the image when laid out at the container width
    pub fn displayed_height(&self) -> Option<f64> {
        let (width, height) = self.slot.natural_size()?;
        if width == 0 || self.container.width <= 0.0 {
            return None;
        }
        Some(height as f64 * self.container.width / width as f64)
    }

    fn max_scroll(&self) -> f64 {
        self.displayed_height()
            .map(|h| (h - self.container.height).max(0.0))
            .unwrap_or(0.0)
    }

    /// Cursor of the selected point in display pixels, relative to the top of
    /// the laid-out image.
    pub fn cursor_position(&self) -> Option<(f64, f64)> {
        let selected = self.selected.as_ref()?;
        let cursor = selected.cursor?;
        let displayed = self.displayed_height()?;
        let (natural_width, natural_height) = self.slot.natural_size()?;
        let (source_width, source_height) = match selected.viewport {
            Some(v) if v.width > 0.0 && v.height > 0.0 => (v.width, v.height),
            _ => (natural_width as f64, natural_height as f64),
        };
        if source_width <= 0.0 || source_height <= 0.0 {
            return None;
        }
        Some((
            cursor.x * self.container.width / source_width,
            cursor.y * displayed / source_height,
        ))
    }

    /// Scroll target that centers the cursor, or `None` when there is
    /// nothing to center on.
    pub fn centering_target(&self) -> Option<f64> {
        let (_, y) = self.cursor_position()?;
        let target = (y - self.container.height / 2.0).max(0.0);
        Some(target.min(self.max_scroll()))
    }

    fn recenter(&mut self) {
        if let Some(target) = self.centering_target() {
            tracing::trace!(target, "Centering frame on cursor");
            self.scroll.animate_to(target);
        }
    }
}
