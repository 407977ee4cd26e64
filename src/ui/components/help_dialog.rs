//! Help overlay listing every action and the keys bound to it.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use super::scrollbar::render_vertical_scrollbar;
use crate::config::KeybindingConfig;
use crate::ui::action::Action;

/// A keybinding entry for display
#[derive(Debug, Clone)]
pub struct KeybindingEntry {
    pub action_description: String,
    pub key_display: String,
}

/// Category for grouping keybindings in the help dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelpCategory {
    General,
    Playback,
    View,
    Scrolling,
}

impl HelpCategory {
    pub fn title(&self) -> &'static str {
        match self {
            HelpCategory::General => "GENERAL",
            HelpCategory::Playback => "PLAYBACK",
            HelpCategory::View => "VIEW",
            HelpCategory::Scrolling => "SCROLLING",
        }
    }

    fn of(action: Action) -> Self {
        match action {
            Action::Quit | Action::ToggleHelp => HelpCategory::General,
            Action::StepBack
            | Action::StepForward
            | Action::StepBackMany
            | Action::StepForwardMany
            | Action::JumpToStart
            | Action::JumpToLive => HelpCategory::Playback,
            Action::CycleRenderMode | Action::NextProposal | Action::PrevProposal => {
                HelpCategory::View
            }
            Action::ScrollUp
            | Action::ScrollDown
            | Action::ScrollPageUp
            | Action::ScrollPageDown
            | Action::ScrollToTop
            | Action::ScrollToBottom => HelpCategory::Scrolling,
        }
    }

    const ORDER: [HelpCategory; 4] = [
        HelpCategory::General,
        HelpCategory::Playback,
        HelpCategory::View,
        HelpCategory::Scrolling,
    ];
}

enum HelpLine {
    Blank,
    Header(&'static str),
    Entry(KeybindingEntry),
}

/// State for the help dialog
#[derive(Default)]
pub struct HelpDialogState {
    visible: bool,
    lines: Vec<HelpLine>,
    scroll_offset: usize,
    visible_height: usize,
}

impl HelpDialogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, config: &KeybindingConfig) {
        self.populate(config);
        self.scroll_offset = 0;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn entry_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, HelpLine::Entry(_)))
            .count()
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        let max = self.lines.len().saturating_sub(self.visible_height.max(1));
        self.scroll_offset = (self.scroll_offset + amount).min(max);
    }

    /// Unbound actions are left out.
    fn populate(&mut self, config: &KeybindingConfig) {
        self.lines.clear();
        for category in HelpCategory::ORDER {
            let entries: Vec<KeybindingEntry> = Action::all()
                .iter()
                .copied()
                .filter(|a| HelpCategory::of(*a) == category)
                .filter_map(|action| {
                    let keys = config.keys_for(action);
                    (!keys.is_empty()).then(|| KeybindingEntry {
                        action_description: action.description().to_string(),
                        key_display: keys.join(", "),
                    })
                })
                .collect();
            if entries.is_empty() {
                continue;
            }
            if !self.lines.is_empty() {
                self.lines.push(HelpLine::Blank);
            }
            self.lines.push(HelpLine::Header(category.title()));
            self.lines.extend(entries.into_iter().map(HelpLine::Entry));
        }
    }
}

pub struct HelpDialog;

impl HelpDialog {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, state: &mut HelpDialogState) {
        if !state.visible {
            return;
        }

        let width = (area.width * 70 / 100).clamp(40.min(area.width), 72);
        let height = (area.height * 80 / 100).clamp(10.min(area.height), 32);
        let dialog = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
        Clear.render(dialog, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help - Keybindings ")
            .title_alignment(Alignment::Center);
        let inner = block.inner(dialog);
        block.render(dialog, buf);
        if inner.height < 2 || inner.width < 4 {
            return;
        }

        let content = Rect::new(inner.x, inner.y, inner.width - 1, inner.height - 1);
        state.visible_height = content.height as usize;
        state.scroll_offset = state
            .scroll_offset
            .min(state.lines.len().saturating_sub(state.visible_height));
        self.render_content(content, buf, state);
        render_vertical_scrollbar(
            Rect::new(inner.x, inner.y, inner.width, content.height),
            buf,
            state.lines.len(),
            state.visible_height,
            state.scroll_offset,
        );

        Paragraph::new(Line::styled(
            "Esc/? close   ↑↓ scroll",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center)
        .render(
            Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1),
            buf,
        );
    }

    fn render_content(&self, area: Rect, buf: &mut Buffer, state: &HelpDialogState) {
        // Same key column width for every entry, not just the visible ones
        let key_width = state
            .lines
            .iter()
            .filter_map(|l| match l {
                HelpLine::Entry(e) => Some(e.key_display.chars().count()),
                _ => None,
            })
            .max()
            .unwrap_or(8)
            .max(8) as u16;

        for (i, line) in state
            .lines
            .iter()
            .skip(state.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            match line {
                HelpLine::Blank => {}
                HelpLine::Header(title) => {
                    let style = Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD);
                    buf.set_line(area.x, y, &Line::styled(*title, style), area.width);
                }
                HelpLine::Entry(entry) => {
                    let pad = key_width as usize - entry.key_display.chars().count();
                    let line = Line::from(vec![
                        Span::raw(" ".repeat(pad + 1)),
                        Span::styled(entry.key_display.clone(), Style::default().fg(Color::Cyan)),
                        Span::raw("  "),
                        Span::styled(
                            entry.action_description.clone(),
                            Style::default().fg(Color::White),
                        ),
                    ]);
                    buf.set_line(area.x, y, &line, area.width);
                }
            }
        }
    }
}

impl Default for HelpDialog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_keybindings;

    fn screen_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn lists_every_bound_action() {
        let mut state = HelpDialogState::new();
        state.show(&default_keybindings());
        assert!(state.is_visible());
        assert_eq!(state.entry_count(), Action::all().len());
    }

    #[test]
    fn renders_categories_and_keys() {
        let mut state = HelpDialogState::new();
        state.show(&default_keybindings());
        let area = Rect::new(0, 0, 80, 40);
        let mut buf = Buffer::empty(area);
        HelpDialog::new().render(area, &mut buf, &mut state);
        let text = screen_text(&buf);
        assert!(text.contains("GENERAL"));
        assert!(text.contains("PLAYBACK"));
        assert!(text.contains("<Left>, h"));
    }

    #[test]
    fn hidden_dialog_draws_nothing() {
        let mut state = HelpDialogState::new();
        let area = Rect::new(0, 0, 40, 20);
        let mut buf = Buffer::empty(area);
        HelpDialog::new().render(area, &mut buf, &mut state);
        assert_eq!(buf, Buffer::empty(area));
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut state = HelpDialogState::new();
        state.show(&default_keybindings());
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        HelpDialog::new().render(area, &mut buf, &mut state);
        state.scroll_down(1000);
        let max = state.lines.len() - state.visible_height;
        assert_eq!(state.scroll_offset, max);
        state.scroll_up(1000);
        assert_eq!(state.scroll_offset, 0);
    }
}
