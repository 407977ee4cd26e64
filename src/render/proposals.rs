//! Proposal-set adapter: a still-image gallery for the selected point

use std::sync::Arc;

use image::DynamicImage;

use super::image::{ImageError, ImageKey, ImageSlot, LoadRequest};
use crate::timeline::{ImageRef, PointKey, TimelinePoint};

#[derive(Debug, Default)]
pub struct ProposalAdapter {
    point: Option<PointKey>,
    proposals: Vec<ImageRef>,
    selected: usize,
    slot: ImageSlot,
}

impl ProposalAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the proposal set of `point`, starting from the first proposal.
    /// Reselecting the same point keeps the current proposal.
    pub fn select(&mut self, key: Option<PointKey>, point: Option<&TimelinePoint>) -> Option<LoadRequest> {
        let (Some(key), Some(point)) = (key, point) else {
            self.clear();
            return None;
        };
        if point.proposals.is_empty() {
            self.clear();
            return None;
        }
        if self.point != Some(key) {
            self.point = Some(key);
            self.selected = 0;
        }
        self.proposals = point.proposals.clone();
        self.selected = self.selected.min(self.proposals.len() - 1);
        self.request_selected()
    }

    pub fn next(&mut self) -> Option<LoadRequest> {
        if self.selected + 1 < self.proposals.len() {
            self.selected += 1;
            return self.request_selected();
        }
        None
    }

    pub fn prev(&mut self) -> Option<LoadRequest> {
        if self.selected > 0 {
            self.selected -= 1;
            return self.request_selected();
        }
        None
    }

    pub fn on_image_loaded(&mut self, key: ImageKey, result: Result<Arc<DynamicImage>, ImageError>) {
        self.slot.complete(key, result);
    }

    pub fn proposals(&self) -> &[ImageRef] {
        &self.proposals
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn slot(&self) -> &ImageSlot {
        &self.slot
    }

    fn request_selected(&mut self) -> Option<LoadRequest> {
        let point = self.point?;
        let image = self.proposals.get(self.selected)?;
        self.slot.request(ImageKey::proposal(point, self.selected), image)
    }

    fn clear(&mut self) {
        self.point = None;
        self.proposals.clear();
        self.selected = 0;
        self.slot.clear();
    }
}
