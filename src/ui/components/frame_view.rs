//! Frame view: draws the selected frame with half-block cells.
//!
//! One cell is one display pixel wide and two tall, so a frame laid out in
//! an area `w` cells wide is `w` pixels wide and `h * 2` pixels tall. The
//! frame adapter works in the same pixel space.

use image::{DynamicImage, GenericImageView};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::Widget,
};

use super::theme::{CURSOR_MARK, ERROR, TEXT_MUTED};
use crate::render::{FrameAdapter, FrameGeometry, SlotState};

/// Pixel geometry of a frame view drawn in `area`
pub fn frame_geometry(area: Rect) -> FrameGeometry {
    FrameGeometry {
        width: area.width as f64,
        height: area.height as f64 * 2.0,
    }
}

pub struct FrameView<'a> {
    adapter: &'a FrameAdapter,
    location: Option<&'a str>,
}

impl<'a> FrameView<'a> {
    pub fn new(adapter: &'a FrameAdapter) -> Self {
        Self {
            adapter,
            location: None,
        }
    }

    /// Label shown when there is no frame
    pub fn location(mut self, location: Option<&'a str>) -> Self {
        self.location = location;
        self
    }

    fn render_placeholder(&self, area: Rect, buf: &mut Buffer) {
        let (text, color) = match self.adapter.slot().state() {
            SlotState::Loading => ("Loading frame…".to_string(), TEXT_MUTED),
            SlotState::Failed(reason) => (format!("Frame unavailable: {reason}"), ERROR),
            SlotState::Empty | SlotState::Ready(_) => {
                ("No frame at this point".to_string(), TEXT_MUTED)
            }
        };
        let y = area.y + area.height / 2;
        let width = (text.chars().count() as u16).min(area.width);
        let x = area.x + (area.width - width) / 2;
        buf.set_line(x, y, &Line::styled(text, Style::default().fg(color)), width);
        if let Some(location) = self.location.filter(|l| !l.is_empty()) {
            if y + 1 < area.y + area.height {
                buf.set_line(
                    area.x,
                    y + 1,
                    &Line::styled(location.to_string(), Style::default().fg(TEXT_MUTED)),
                    area.width,
                );
            }
        }
    }
}

pub(super) fn pixel_color(image: &DynamicImage, x: u32, y: u32) -> Color {
    let [r, g, b, _] = image.get_pixel(x, y).0;
    Color::Rgb(r, g, b)
}

impl Widget for FrameView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let (Some(image), Some(displayed_height)) =
            (self.adapter.image(), self.adapter.displayed_height())
        else {
            self.render_placeholder(area, buf);
            return;
        };
        let (natural_width, natural_height) = image.dimensions();
        if natural_width == 0 || natural_height == 0 || displayed_height <= 0.0 {
            self.render_placeholder(area, buf);
            return;
        }

        let scroll = self.adapter.scroll_offset();
        let display_width = area.width as f64;
        // display pixel row -> source pixel row
        let source_y = |display_y: f64| -> Option<u32> {
            if display_y < 0.0 || display_y >= displayed_height {
                return None;
            }
            let y = (display_y / displayed_height * natural_height as f64) as u32;
            Some(y.min(natural_height - 1))
        };

        for row in 0..area.height {
            let top = source_y(scroll + row as f64 * 2.0);
            let bottom = source_y(scroll + row as f64 * 2.0 + 1.0);
            for col in 0..area.width {
                let x = ((col as f64 / display_width) * natural_width as f64) as u32;
                let x = x.min(natural_width - 1);
                let cell = &mut buf[(area.x + col, area.y + row)];
                match (top, bottom) {
                    (Some(top), Some(bottom)) => {
                        cell.set_symbol("▀").set_style(
                            Style::default()
                                .fg(pixel_color(image, x, top))
                                .bg(pixel_color(image, x, bottom)),
                        );
                    }
                    (Some(top), None) => {
                        cell.set_symbol("▀")
                            .set_style(Style::default().fg(pixel_color(image, x, top)));
                    }
                    (None, _) => {}
                }
            }
        }

        if let Some((cursor_x, cursor_y)) = self.adapter.cursor_position() {
            let row = ((cursor_y - scroll) / 2.0).floor();
            let col = cursor_x.floor();
            if row >= 0.0 && row < area.height as f64 && col >= 0.0 && col < area.width as f64 {
                buf[(area.x + col as u16, area.y + row as u16)]
                    .set_symbol("✛")
                    .set_style(Style::default().fg(CURSOR_MARK).bg(Color::Black));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{ImageRef, PointIndex, TimelinePoint};
    use image::{Rgba, RgbaImage};
    use std::sync::Arc;

    fn loaded_adapter(area: Rect, image: DynamicImage, point: TimelinePoint) -> FrameAdapter {
        let mut adapter = FrameAdapter::new(0);
        adapter.set_container(frame_geometry(area));
        let index = PointIndex::from_points(&[point.clone()]);
        let request = adapter.select(index.key_of(0), Some(&point)).unwrap();
        adapter.on_image_loaded(request.key, Ok(Arc::new(image)));
        adapter
    }

    #[test]
    fn geometry_is_two_pixels_per_row() {
        let geometry = frame_geometry(Rect::new(0, 0, 40, 10));
        assert_eq!(geometry.width, 40.0);
        assert_eq!(geometry.height, 20.0);
    }

    #[test]
    fn draws_half_blocks_from_pixels() {
        let area = Rect::new(0, 0, 2, 1);
        let mut pixels = RgbaImage::new(2, 2);
        pixels.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        pixels.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        let point = TimelinePoint::frame(1.0, ImageRef::path("x.png"));
        let adapter = loaded_adapter(area, DynamicImage::ImageRgba8(pixels), point);

        let mut buf = Buffer::empty(area);
        FrameView::new(&adapter).render(area, &mut buf);
        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn cursor_is_marked() {
        let area = Rect::new(0, 0, 10, 5);
        let point = TimelinePoint::frame(1.0, ImageRef::path("x.png"))
            .with_cursor(5.0, 4.0)
            .with_viewport(10.0, 10.0);
        let adapter = loaded_adapter(area, DynamicImage::new_rgba8(10, 10), point);

        let mut buf = Buffer::empty(area);
        FrameView::new(&adapter).render(area, &mut buf);
        assert_eq!(buf[(5, 2)].symbol(), "✛");
    }

    #[test]
    fn placeholder_without_frame() {
        let area = Rect::new(0, 0, 30, 3);
        let adapter = FrameAdapter::new(0);
        let mut buf = Buffer::empty(area);
        FrameView::new(&adapter).render(area, &mut buf);
        let row: String = (0..30).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("No frame at this point"));
    }
}
