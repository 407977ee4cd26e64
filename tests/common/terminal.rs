//! TUI testing utilities using Ratatui's TestBackend

use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};

pub fn create_test_terminal_sized(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Convert a buffer to a string, one line per row
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut output = String::new();
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                output.push_str(cell.symbol());
            }
        }
        output.push('\n');
    }
    output
}

/// One row of the buffer with trailing whitespace removed
pub fn row_text(buffer: &Buffer, y: u16) -> String {
    buffer_region_to_string(buffer, Rect::new(0, y, buffer.area.width, 1))
        .trim_end()
        .to_string()
}

pub fn buffer_region_to_string(buffer: &Buffer, area: Rect) -> String {
    let mut output = String::new();
    for y in area.y..area.y.saturating_add(area.height) {
        for x in area.x..area.x.saturating_add(area.width) {
            if let Some(cell) = buffer.cell((x, y)) {
                output.push_str(cell.symbol());
            }
        }
        if y + 1 < area.y + area.height {
            output.push('\n');
        }
    }
    output
}

/// Check if the buffer contains a string anywhere
pub fn buffer_contains(buffer: &Buffer, text: &str) -> bool {
    buffer_to_string(buffer).contains(text)
}

/// Column of the first cell in row `y` showing `symbol`
pub fn find_symbol_in_row(buffer: &Buffer, y: u16, symbol: &str) -> Option<u16> {
    (0..buffer.area.width).find(|&x| buffer.cell((x, y)).map(|c| c.symbol()) == Some(symbol))
}
