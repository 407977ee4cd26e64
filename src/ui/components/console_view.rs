//! Console view: visible window of the replay buffer with ANSI colors.

use ansi_to_tui::IntoText;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

use super::scrollbar::render_vertical_scrollbar;
use super::theme::TEXT_MUTED;
use crate::replay::TextBuffer;

pub struct ConsoleView<'a> {
    buffer: Option<&'a TextBuffer>,
}

impl<'a> ConsoleView<'a> {
    pub fn new(buffer: Option<&'a TextBuffer>) -> Self {
        Self { buffer }
    }
}

/// Parse one stored line, keeping SGR styling. Unparseable escapes fall back
/// to the raw text.
fn styled_line(raw: &str) -> Line<'static> {
    match raw.as_bytes().into_text() {
        Ok(text) => Line::from(
            text.lines
                .into_iter()
                .flat_map(|l| l.spans)
                .map(|s| Span::styled(s.content.into_owned(), s.style))
                .collect::<Vec<_>>(),
        ),
        Err(_) => Line::raw(raw.to_string()),
    }
}

impl Widget for ConsoleView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let Some(buffer) = self.buffer else {
            return;
        };
        if buffer.line_count() == 0 {
            buf.set_line(
                area.x,
                area.y,
                &Line::styled("(no console output yet)", Style::default().fg(TEXT_MUTED)),
                area.width,
            );
            return;
        }

        let text_width = area.width.saturating_sub(1);
        for (row, raw) in buffer.visible_lines().iter().enumerate() {
            let y = area.y + row as u16;
            if y >= area.y + area.height {
                break;
            }
            buf.set_line(area.x, y, &styled_line(raw), text_width);
        }

        let (total, visible, top) = buffer.scroll_metrics();
        render_vertical_scrollbar(area, buf, total, visible, top);
    }
}
