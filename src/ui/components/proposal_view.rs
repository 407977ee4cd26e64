//! Proposal view: the selected proposal image fitted into the area, with a
//! "n/m" caption line.

use image::GenericImageView;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use super::frame_view::pixel_color;
use super::theme::{ERROR, TEXT_MUTED};
use crate::render::{ProposalAdapter, SlotState};

pub struct ProposalView<'a> {
    adapter: &'a ProposalAdapter,
}

impl<'a> ProposalView<'a> {
    pub fn new(adapter: &'a ProposalAdapter) -> Self {
        Self { adapter }
    }
}

impl Widget for ProposalView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let proposals = self.adapter.proposals();
        let muted = Style::default().fg(TEXT_MUTED);
        if proposals.is_empty() {
            buf.set_line(area.x, area.y, &Line::styled("No proposals at this point", muted), area.width);
            return;
        }

        let selected = self.adapter.selected();
        let caption = Line::from(vec![
            Span::styled(
                format!("Proposal {}/{}", selected + 1, proposals.len()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", proposals[selected].label()), muted),
        ]);
        buf.set_line(area.x, area.y, &caption, area.width);

        let body = Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(1));
        if body.height == 0 {
            return;
        }

        let image = match self.adapter.slot().state() {
            SlotState::Ready(image) => image,
            SlotState::Failed(reason) => {
                let line = Line::styled(format!("Proposal unavailable: {reason}"), Style::default().fg(ERROR));
                buf.set_line(body.x, body.y, &line, body.width);
                return;
            }
            SlotState::Loading | SlotState::Empty => {
                buf.set_line(body.x, body.y, &Line::styled("Loading proposal…", muted), body.width);
                return;
            }
        };

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        // Fit inside the body, one cell = 1x2 pixels
        let max_w = body.width as f64;
        let max_h = body.height as f64 * 2.0;
        let scale = (max_w / width as f64).min(max_h / height as f64);
        let draw_w = ((width as f64 * scale).floor() as u16).clamp(1, body.width);
        let draw_h = (height as f64 * scale).clamp(1.0, max_h);
        let offset_x = body.x + (body.width - draw_w) / 2;

        let rows = ((draw_h / 2.0).ceil() as u16).min(body.height);
        for row in 0..rows {
            let py = |sub: f64| -> Option<u32> {
                let y = row as f64 * 2.0 + sub;
                (y < draw_h).then(|| ((y / scale) as u32).min(height - 1))
            };
            let (top, bottom) = (py(0.0), py(1.0));
            for col in 0..draw_w {
                let x = ((col as f64 / scale) as u32).min(width - 1);
                let cell = &mut buf[(offset_x + col, body.y + row)];
                let mut style = Style::default();
                if let Some(top) = top {
                    style = style.fg(pixel_color(image, x, top));
                }
                if let Some(bottom) = bottom {
                    style = style.bg(pixel_color(image, x, bottom));
                }
                cell.set_symbol("▀").set_style(style);
            }
        }
    }
}
