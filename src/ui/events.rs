use std::sync::Arc;

use image::DynamicImage;

use crate::feed::FeedUpdate;
use crate::render::{ImageError, ImageKey};

/// Application-level events
#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event
    Input(crossterm::event::Event),

    /// New points, or a reset, from the feed
    Feed(FeedUpdate),

    /// Feed task finished; `error` is set when it gave up
    FeedStopped { error: Option<String> },

    /// Background image decode finished
    ImageLoaded {
        key: ImageKey,
        result: Result<Arc<DynamicImage>, ImageError>,
    },
}
