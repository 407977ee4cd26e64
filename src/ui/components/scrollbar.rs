//! Shared scrollbar rendering.

use ratatui::prelude::StatefulWidget;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState},
};

/// Render a vertical scrollbar on the right edge of `area` when the content
/// overflows. `offset` is the first visible row.
pub fn render_vertical_scrollbar(
    area: Rect,
    buf: &mut Buffer,
    total: usize,
    visible: usize,
    offset: usize,
) {
    if total <= visible || area.width == 0 {
        return;
    }
    let max_scroll = total.saturating_sub(visible);
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("▲"))
        .end_symbol(Some("▼"))
        .track_symbol(Some("│"))
        .thumb_symbol("█");
    let mut state = ScrollbarState::new(max_scroll).position(offset.min(max_scroll));
    scrollbar.render(area, buf, &mut state);
}
