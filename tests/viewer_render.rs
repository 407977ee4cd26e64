//! Viewer drawn on a TestBackend: layout, mouse scrubbing, views.

mod common;

use std::sync::Arc;

use common::fixtures::{chunk, frame_point, solid_png, ticks};
use common::terminal::{buffer_contains, create_test_terminal_sized, find_symbol_in_row, row_text};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{backend::TestBackend, style::Color, Terminal};
use tempfile::TempDir;
use timeline::feed::FeedUpdate;
use timeline::render::{load_image, ActiveView, RenderMode};
use timeline::{Config, Viewer};

// 40x12 layout: header 0, content 1..=7, hover 8, track 9..=10, footer 11
const WIDTH: u16 = 40;
const HEIGHT: u16 = 12;
const HOVER_ROW: u16 = 8;
const TRACK_ROW: u16 = 9;
const LABEL_ROW: u16 = 10;

fn draw(terminal: &mut Terminal<TestBackend>, viewer: &mut Viewer) {
    terminal.draw(|f| viewer.draw(f)).unwrap();
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

fn setup() -> (Terminal<TestBackend>, Viewer) {
    let terminal = create_test_terminal_sized(WIDTH, HEIGHT);
    let viewer = Viewer::new(Config::default(), RenderMode::Auto).with_source("test.tape");
    (terminal, viewer)
}

#[test]
fn empty_timeline_renders_placeholders() {
    let (mut terminal, mut viewer) = setup();
    draw(&mut terminal, &mut viewer);
    let buffer = terminal.backend().buffer();

    assert!(row_text(buffer, 0).starts_with(" LIVE  test.tape"));
    assert!(row_text(buffer, LABEL_ROW).starts_with("no points"));
    assert!(buffer_contains(buffer, "No frame at this point"));
    assert!(row_text(buffer, HEIGHT - 1).contains("prev"));
}

#[test]
fn live_playhead_sits_at_track_end() {
    let (mut terminal, mut viewer) = setup();
    viewer.apply_feed(FeedUpdate::Points(ticks(11)));
    draw(&mut terminal, &mut viewer);
    let buffer = terminal.backend().buffer();

    assert_eq!(find_symbol_in_row(buffer, TRACK_ROW, "█"), Some(WIDTH - 1));
    assert_eq!(buffer[(WIDTH - 1, TRACK_ROW)].fg, timeline::ui::components::theme::LIVE);
    assert!(row_text(buffer, LABEL_ROW).starts_with("0.0s"));
    assert!(row_text(buffer, LABEL_ROW).ends_with("10.0s"));
}

#[test]
fn mouse_drag_scrubs_and_releases_grab() {
    let (mut terminal, mut viewer) = setup();
    viewer.apply_feed(FeedUpdate::Points(ticks(11)));
    draw(&mut terminal, &mut viewer);

    viewer.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 0, TRACK_ROW));
    assert_eq!(viewer.controller().current_time(), Some(0.0));
    assert!(viewer.controller().is_dragging());

    // Dragging off the track still scrubs
    viewer.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 20, 2));
    assert_eq!(viewer.controller().current_time(), Some(5.0));

    viewer.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 20, 2));
    assert!(!viewer.controller().is_dragging());
    assert!(!viewer.controller().is_live());

    // Motion after release does not move the playhead
    viewer.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 39, 2));
    assert_eq!(viewer.controller().current_time(), Some(5.0));

    draw(&mut terminal, &mut viewer);
    let buffer = terminal.backend().buffer();
    assert!(row_text(buffer, 0).starts_with(" SCRUBBED"));
    assert_eq!(find_symbol_in_row(buffer, TRACK_ROW, "█"), Some(20));
}

#[test]
fn focus_loss_cancels_drag() {
    let (mut terminal, mut viewer) = setup();
    viewer.apply_feed(FeedUpdate::Points(ticks(11)));
    draw(&mut terminal, &mut viewer);

    viewer.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), 4, TRACK_ROW));
    assert!(viewer.controller().is_dragging());
    viewer.handle_event(&Event::FocusLost);
    assert!(!viewer.controller().is_dragging());
}

#[test]
fn hover_shows_preview_only_behind_playhead() {
    let (mut terminal, mut viewer) = setup();
    viewer.apply_feed(FeedUpdate::Points(ticks(11)));
    draw(&mut terminal, &mut viewer);

    viewer.handle_event(&mouse(MouseEventKind::Moved, 0, TRACK_ROW));
    draw(&mut terminal, &mut viewer);
    assert!(row_text(terminal.backend().buffer(), HOVER_ROW).starts_with("◂ 0.0s"));

    // Hovering the playhead itself previews nothing
    viewer.handle_event(&mouse(MouseEventKind::Moved, WIDTH - 1, TRACK_ROW));
    draw(&mut terminal, &mut viewer);
    assert_eq!(row_text(terminal.backend().buffer(), HOVER_ROW), "");

    viewer.handle_event(&mouse(MouseEventKind::Moved, 5, 3));
    assert_eq!(viewer.hover(), None);
}

#[test]
fn loaded_frame_is_drawn_with_half_blocks() {
    let dir = TempDir::new().unwrap();
    let png = solid_png(dir.path(), "frame.png", 8, 8, [200, 10, 10, 255]);
    let (mut terminal, mut viewer) = setup();
    viewer.apply_feed(FeedUpdate::Points(vec![frame_point(1.0, &png)]));
    draw(&mut terminal, &mut viewer);
    assert!(buffer_contains(terminal.backend().buffer(), "Loading frame"));

    for request in viewer.take_load_requests() {
        let result = load_image(&request.image).map(Arc::new);
        viewer.on_image_loaded(request.key, result);
    }
    draw(&mut terminal, &mut viewer);
    let cell = &terminal.backend().buffer()[(0, 1)];
    assert_eq!(cell.symbol(), "▀");
    assert_eq!(cell.fg, Color::Rgb(200, 10, 10));
}

#[test]
fn missing_frame_file_shows_error_placeholder() {
    let dir = TempDir::new().unwrap();
    let (mut terminal, mut viewer) = setup();
    viewer.apply_feed(FeedUpdate::Points(vec![frame_point(
        1.0,
        &dir.path().join("gone.png"),
    )]));
    for request in viewer.take_load_requests() {
        let result = load_image(&request.image).map(Arc::new);
        viewer.on_image_loaded(request.key, result);
    }
    draw(&mut terminal, &mut viewer);
    assert!(buffer_contains(terminal.backend().buffer(), "Frame unavailable"));
}

#[test]
fn console_points_switch_to_console_view() {
    let (mut terminal, mut viewer) = setup();
    viewer.apply_feed(FeedUpdate::Points(vec![
        chunk(1.0, "s", "first line\n"),
        chunk(2.0, "s", "second line\n"),
    ]));
    assert_eq!(viewer.presenter().active(), ActiveView::Console);
    draw(&mut terminal, &mut viewer);
    let buffer = terminal.backend().buffer();
    assert!(buffer_contains(buffer, "first line"));
    assert!(buffer_contains(buffer, "second line"));

    viewer.handle_event(&Event::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)));
    draw(&mut terminal, &mut viewer);
    let buffer = terminal.backend().buffer();
    assert!(buffer_contains(buffer, "first line"));
    assert!(!buffer_contains(buffer, "second line"));
}

#[test]
fn help_overlay_draws_over_content() {
    let (mut terminal, mut viewer) = setup();
    let mut terminal_big = create_test_terminal_sized(80, 30);
    viewer.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE)));
    draw(&mut terminal, &mut viewer);
    assert!(buffer_contains(terminal.backend().buffer(), "Help"));

    draw(&mut terminal_big, &mut viewer);
    assert!(buffer_contains(terminal_big.backend().buffer(), "PLAYBACK"));

    viewer.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
    assert!(viewer.should_quit());
}
