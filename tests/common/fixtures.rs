//! Point fixtures and tape files

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use timeline::timeline::{ImageRef, TimelinePoint};

/// `n` bare points at 0, 1, 2, ... seconds
pub fn ticks(n: usize) -> Vec<TimelinePoint> {
    (0..n).map(|i| TimelinePoint::at(i as f64)).collect()
}

/// Console chunk for `session` at `time`
pub fn chunk(time: f64, session: &str, text: &str) -> TimelinePoint {
    TimelinePoint::console(time, session, text)
}

/// Write a solid PNG of the given size and color into `dir`
pub fn solid_png(dir: &Path, name: &str, width: u32, height: u32, rgba: [u8; 4]) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba(rgba))
        .save(&path)
        .expect("write png");
    path
}

/// Frame point backed by a PNG on disk
pub fn frame_point(time: f64, png: &Path) -> TimelinePoint {
    TimelinePoint::frame(time, ImageRef::path(png)).with_location(format!("frame@{time}"))
}
