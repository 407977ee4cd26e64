//! Image loading and per-adapter load tracking

use std::path::PathBuf;
use std::sync::Arc;

use base64::{prelude::BASE64_STANDARD, Engine as _};
use image::DynamicImage;
use thiserror::Error;

use crate::timeline::{ImageRef, PointKey};

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid inline image data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decode an image reference. Blocking; hosts run it off the UI task.
pub fn load_image(image: &ImageRef) -> Result<DynamicImage, ImageError> {
    let bytes = match image {
        ImageRef::Path(path) => std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.clone(),
            source,
        })?,
        ImageRef::Inline { data, .. } => BASE64_STANDARD.decode(data.trim())?,
    };
    Ok(image::load_from_memory(&bytes)?)
}

/// Identifies which image of which point a load belongs to.
///
/// Slot 0 is the captured frame, slot `n > 0` is proposal `n - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageKey {
    pub point: PointKey,
    pub slot: usize,
}

impl ImageKey {
    pub fn frame(point: PointKey) -> Self {
        Self { point, slot: 0 }
    }

    pub fn proposal(point: PointKey, index: usize) -> Self {
        Self {
            point,
            slot: index + 1,
        }
    }

    pub fn is_frame(&self) -> bool {
        self.slot == 0
    }
}

/// Work item for the host's image loader
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub key: ImageKey,
    pub image: ImageRef,
}

#[derive(Debug, Clone)]
pub enum SlotState {
    Empty,
    Loading,
    Ready(Arc<DynamicImage>),
    Failed(String),
}

/// One displayed image and the load that will fill it.
///
/// Completions whose key no longer matches the expected one are stale and
/// dropped.
#[derive(Debug, Clone)]
pub struct ImageSlot {
    expected: Option<ImageKey>,
    source: Option<ImageRef>,
    state: SlotState,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self {
            expected: None,
            source: None,
            state: SlotState::Empty,
        }
    }

    /// Expect `image` under `key`. Returns a load request unless the same
    /// image is already decoded or in flight under the same key.
    pub fn request(&mut self, key: ImageKey, image: &ImageRef) -> Option<LoadRequest> {
        let same_source = self.source.as_ref() == Some(image);
        let in_flight = self.expected == Some(key) && matches!(self.state, SlotState::Loading);
        self.expected = Some(key);
        if same_source && (in_flight || matches!(self.state, SlotState::Ready(_))) {
            return None;
        }
        self.source = Some(image.clone());
        self.state = SlotState::Loading;
        Some(LoadRequest {
            key,
            image: image.clone(),
        })
    }

    pub fn clear(&mut self) {
        self.expected = None;
        self.source = None;
        self.state = SlotState::Empty;
    }

    /// Apply a finished load. Returns `true` when the result was accepted.
    pub fn complete(
        &mut self,
        key: ImageKey,
        result: Result<Arc<DynamicImage>, ImageError>,
    ) -> bool {
        if self.expected != Some(key) || !matches!(self.state, SlotState::Loading) {
            tracing::debug!(?key, "Discarding stale image load");
            return false;
        }
        self.state = match result {
            Ok(image) => SlotState::Ready(image),
            Err(e) => {
                tracing::warn!(error = %e, source = ?self.source, "Image failed to load");
                SlotState::Failed(e.to_string())
            }
        };
        true
    }

    pub fn state(&self) -> &SlotState {
        &self.state
    }

    pub fn image(&self) -> Option<&Arc<DynamicImage>> {
        match &self.state {
            SlotState::Ready(image) => Some(image),
            _ => None,
        }
    }

    pub fn natural_size(&self) -> Option<(u32, u32)> {
        self.image().map(|image| (image.width(), image.height()))
    }

    pub fn source(&self) -> Option<&ImageRef> {
        self.source.as_ref()
    }
}

impl Default for ImageSlot {
    fn default() -> Self {
        Self::new()
    }
}
