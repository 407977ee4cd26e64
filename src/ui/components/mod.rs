mod console_view;
mod frame_view;
mod help_dialog;
mod key_hints;
mod proposal_view;
mod scrollbar;
mod scrub_track;
mod status_bar;
pub mod theme;

pub use console_view::ConsoleView;
pub use frame_view::{frame_geometry, FrameView};
pub use help_dialog::{HelpCategory, HelpDialog, HelpDialogState, KeybindingEntry};
pub use key_hints::{footer_hints, render_key_hints, KeyHintBarStyle};
pub use proposal_view::ProposalView;
pub use scrollbar::render_vertical_scrollbar;
pub use scrub_track::{column_at_percent, percent_at_column, ScrubTrack};
pub use status_bar::{truncate_to_width, StatusBar};

/// Timeline seconds as `12.3s`, or `m:ss.s` from one minute up
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "--".to_string();
    }
    let sign = if seconds < 0.0 { "-" } else { "" };
    let seconds = seconds.abs();
    if seconds < 60.0 {
        return format!("{sign}{seconds:.1}s");
    }
    let tenths = (seconds * 10.0).round() as u64;
    let minutes = tenths / 600;
    let rest = tenths % 600;
    format!("{sign}{minutes}:{:02}.{}", rest / 10, rest % 10)
}

#[cfg(test)]
mod tests {
    use super::format_time;

    #[test]
    fn formats_seconds_and_minutes() {
        assert_eq!(format_time(0.0), "0.0s");
        assert_eq!(format_time(12.34), "12.3s");
        assert_eq!(format_time(60.0), "1:00.0");
        assert_eq!(format_time(125.46), "2:05.5");
        assert_eq!(format_time(-3.0), "-3.0s");
        assert_eq!(format_time(f64::NAN), "--");
    }
}
