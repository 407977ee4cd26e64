//! In-memory console surface.
//!
//! `TextBuffer` is the [`ReplaySurface`] used by the terminal host. Output is
//! kept as complete lines plus an open trailing line. Scrolling is either
//! following the bottom or pinned to a top line, so appends never move the
//! text an operator is reading.

use super::ReplaySurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scroll {
    Following,
    Pinned { top: usize },
}

#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<String>,
    scroll: Scroll,
    /// Rows available when last rendered
    viewport_height: usize,
    /// Chunk ended in `\r`; resolved by the next chunk (`\n` makes it CRLF)
    pending_cr: bool,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            scroll: Scroll::Following,
            viewport_height: 1,
            pending_cr: false,
        }
    }

    /// Full buffer text
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }

    /// Number of lines, counting the open trailing line only when it has text
    pub fn line_count(&self) -> usize {
        match self.lines.last() {
            Some(last) if last.is_empty() => self.lines.len() - 1,
            _ => self.lines.len(),
        }
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        if let Scroll::Pinned { top } = self.scroll {
            if top >= self.max_top() {
                self.scroll = Scroll::Following;
            }
        }
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    fn max_top(&self) -> usize {
        self.line_count().saturating_sub(self.viewport_height)
    }

    /// First visible line
    pub fn top_line(&self) -> usize {
        match self.scroll {
            Scroll::Following => self.max_top(),
            Scroll::Pinned { top } => top.min(self.max_top()),
        }
    }

    pub fn visible_lines(&self) -> &[String] {
        let start = self.top_line();
        let end = (start + self.viewport_height).min(self.line_count());
        &self.lines[start..end]
    }

    pub fn scroll_up(&mut self, n: usize) {
        let top = self.top_line().saturating_sub(n);
        if top < self.max_top() {
            self.scroll = Scroll::Pinned { top };
        }
    }

    pub fn scroll_down(&mut self, n: usize) {
        if let Scroll::Pinned { top } = self.scroll {
            let top = top.saturating_add(n);
            self.scroll = if top >= self.max_top() {
                Scroll::Following
            } else {
                Scroll::Pinned { top }
            };
        }
    }

    pub fn scroll_to_top(&mut self) {
        if self.max_top() > 0 {
            self.scroll = Scroll::Pinned { top: 0 };
        }
    }

    /// Scrollbar numbers: (total lines, visible rows, offset from top)
    pub fn scroll_metrics(&self) -> (usize, usize, usize) {
        (self.line_count(), self.viewport_height, self.top_line())
    }

    fn push_text(&mut self, text: &str) {
        if std::mem::take(&mut self.pending_cr) && !text.starts_with('\n') {
            self.write_segment("\r");
        }
        let text = match text.strip_suffix('\r') {
            Some(head) => {
                self.pending_cr = true;
                head
            }
            None => text,
        };
        let text = text.replace("\r\n", "\n");
        let mut segments = text.split('\n');
        if let Some(first) = segments.next() {
            self.write_segment(first);
        }
        for segment in segments {
            self.lines.push(String::new());
            self.write_segment(segment);
        }
    }

    /// Write into the open line. A bare `\r` rewinds to the start of the line,
    /// which is how progress bars redraw themselves.
    fn write_segment(&mut self, segment: &str) {
        let Some(current) = self.lines.last_mut() else {
            return;
        };
        let mut parts = segment.split('\r');
        if let Some(first) = parts.next() {
            current.push_str(first);
        }
        for part in parts {
            current.clear();
            current.push_str(part);
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplaySurface for TextBuffer {
    fn reset(&mut self) {
        self.lines.clear();
        self.lines.push(String::new());
        self.scroll = Scroll::Following;
        self.pending_cr = false;
    }

    fn append(&mut self, text: &str) {
        self.push_text(text);
    }

    fn is_at_bottom(&self) -> bool {
        self.top_line() >= self.max_top()
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll = Scroll::Following;
    }
}
