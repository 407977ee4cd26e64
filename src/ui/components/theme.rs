//! Shared UI color constants.

use ratatui::style::Color;

pub const HEADER_BG: Color = Color::Rgb(30, 30, 30);
pub const FOOTER_BG: Color = Color::Rgb(25, 25, 25);
pub const KEY_HINT_BG: Color = Color::Rgb(60, 60, 60);

pub const TEXT_PRIMARY: Color = Color::Rgb(220, 220, 220);
pub const TEXT_MUTED: Color = Color::Rgb(120, 120, 120);

pub const LIVE: Color = Color::Rgb(80, 200, 120);
pub const SCRUBBED: Color = Color::Rgb(230, 180, 80);
pub const ACCENT: Color = Color::Rgb(100, 160, 255);
pub const ERROR: Color = Color::Rgb(230, 90, 90);

pub const TRACK: Color = Color::Rgb(70, 70, 70);
pub const TRACK_POINT: Color = Color::Rgb(140, 140, 140);
pub const CURSOR_MARK: Color = Color::Rgb(255, 80, 200);
