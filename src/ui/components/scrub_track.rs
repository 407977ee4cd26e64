//! Scrub track: point marks, playhead, hover marker and time labels.
//!
//! Row 0 is the track, row 1 the labels. Columns map linearly onto the
//! index's percentage scale; the first and last columns are 0% and 100%.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use super::format_time;
use super::theme::{ACCENT, LIVE, SCRUBBED, TEXT_MUTED, TRACK, TRACK_POINT};
use crate::timeline::PlaybackController;

/// Percentage under `column` of a track drawn in `area`. Columns outside the
/// track clamp to its ends.
pub fn percent_at_column(area: Rect, column: u16) -> f64 {
    if area.width <= 1 {
        return 0.0;
    }
    let last = area.width - 1;
    let offset = column.saturating_sub(area.x).min(last);
    offset as f64 / last as f64 * 100.0
}

/// Column that shows `percent` on a track drawn in `area`
pub fn column_at_percent(area: Rect, percent: f64) -> u16 {
    if area.width <= 1 {
        return area.x;
    }
    let last = (area.width - 1) as f64;
    let offset = (percent.clamp(0.0, 100.0) / 100.0 * last).round() as u16;
    area.x + offset
}

pub struct ScrubTrack<'a> {
    controller: &'a PlaybackController,
    /// Hovered position in percent
    hover: Option<f64>,
}

impl<'a> ScrubTrack<'a> {
    pub fn new(controller: &'a PlaybackController) -> Self {
        Self {
            controller,
            hover: None,
        }
    }

    pub fn hover(mut self, hover: Option<f64>) -> Self {
        self.hover = hover;
        self
    }
}

impl Widget for ScrubTrack<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let track = Rect::new(area.x, area.y, area.width, 1);
        let index = self.controller.index();

        for x in track.x..track.x + track.width {
            buf[(x, track.y)]
                .set_symbol("─")
                .set_style(Style::default().fg(TRACK));
        }

        for point in index.points() {
            let x = column_at_percent(track, index.percent(point.time));
            buf[(x, track.y)]
                .set_symbol("┼")
                .set_style(Style::default().fg(TRACK_POINT));
        }

        if let Some(hover) = self.hover {
            let x = column_at_percent(track, hover);
            buf[(x, track.y)]
                .set_symbol("┃")
                .set_style(Style::default().fg(ACCENT));
        }

        if let Some(percent) = self.controller.percent_of_current() {
            let color = if self.controller.is_live() { LIVE } else { SCRUBBED };
            let x = column_at_percent(track, percent);
            buf[(x, track.y)]
                .set_symbol("█")
                .set_style(Style::default().fg(color));
        }

        if area.height < 2 {
            return;
        }
        let labels_y = area.y + 1;
        let muted = Style::default().fg(TEXT_MUTED);
        let (Some(start), Some(end)) = (index.start_time(), index.end_time()) else {
            buf.set_line(area.x, labels_y, &Line::styled("no points", muted), area.width);
            return;
        };

        let start_label = format_time(start);
        let end_label = format_time(end);
        buf.set_line(area.x, labels_y, &Line::styled(start_label, muted), area.width);
        let end_width = end_label.chars().count() as u16;
        if end_width < area.width {
            buf.set_line(
                area.x + area.width - end_width,
                labels_y,
                &Line::styled(end_label, muted),
                end_width,
            );
        }

        if let Some(current) = self.controller.current_time() {
            let label = Line::from(vec![Span::styled(
                format_time(current),
                Style::default().add_modifier(Modifier::BOLD),
            )]);
            let width = label.width() as u16;
            if width < area.width {
                let center = column_at_percent(track, index.percent(current));
                let x = center
                    .saturating_sub(width / 2)
                    .clamp(area.x, area.x + area.width - width);
                buf.set_line(x, labels_y, &label, width);
            }
        }
    }
}
