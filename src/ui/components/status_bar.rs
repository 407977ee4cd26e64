use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use super::format_time;
use super::theme::{HEADER_BG, LIVE, SCRUBBED, TEXT_MUTED, TEXT_PRIMARY};
use crate::render::{ActiveView, RenderMode};
use crate::timeline::PlaybackController;

/// Header line: playback state, location, selected time, view and position
pub struct StatusBar<'a> {
    controller: &'a PlaybackController,
    mode: RenderMode,
    active: ActiveView,
    source: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new(controller: &'a PlaybackController, mode: RenderMode, active: ActiveView) -> Self {
        Self {
            controller,
            mode,
            active,
            source: None,
        }
    }

    /// Tape name shown when the selected point carries no location
    pub fn source(mut self, source: Option<&'a str>) -> Self {
        self.source = source;
        self
    }

    fn badge(&self) -> Span<'static> {
        let (label, color) = if self.controller.is_live() {
            (" LIVE ", LIVE)
        } else {
            (" SCRUBBED ", SCRUBBED)
        };
        Span::styled(
            label,
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        )
    }

    fn right_side(&self) -> String {
        let index = self.controller.index();
        let time = self
            .controller
            .current_time()
            .map(format_time)
            .unwrap_or_else(|| "--".to_string());
        let position = match self.controller.current_index() {
            Some(i) => format!("{}/{}", i + 1, index.len()),
            None => format!("-/{}", index.len()),
        };
        let view = if self.mode == RenderMode::Auto {
            format!("auto:{}", self.active)
        } else {
            self.active.to_string()
        };
        format!("{time}  {view}  {position} ")
    }
}

/// Cut `text` to at most `max` columns, marking the cut with an ellipsis
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        buf.set_style(area, Style::default().bg(HEADER_BG));

        let badge = self.badge();
        let right = self.right_side();
        let right_width = right.width() as u16;
        let badge_width = badge.width() as u16;

        let location = self
            .controller
            .current_point()
            .map(|p| p.location.as_str())
            .filter(|l| !l.is_empty())
            .or(self.source)
            .unwrap_or("");
        let room = area
            .width
            .saturating_sub(badge_width + right_width + 2) as usize;
        let location = truncate_to_width(location, room);

        let left = Line::from(vec![
            badge,
            Span::raw(" "),
            Span::styled(location, Style::default().fg(TEXT_PRIMARY)),
        ]);
        buf.set_line(area.x, area.y, &left, area.width);

        if right_width < area.width {
            buf.set_line(
                area.x + area.width - right_width,
                area.y,
                &Line::styled(right, Style::default().fg(TEXT_MUTED)),
                right_width,
            );
        }
    }
}
