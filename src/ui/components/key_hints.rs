//! Footer key hint rendering.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::theme::{FOOTER_BG, KEY_HINT_BG, TEXT_MUTED, TEXT_PRIMARY};
use crate::config::KeybindingConfig;
use crate::ui::action::Action;

#[derive(Debug, Clone, Copy)]
pub struct KeyHintBarStyle {
    pub key_style: Style,
    pub action_style: Style,
    pub item_gap: &'static str,
    pub leading: &'static str,
    pub alignment: Alignment,
    pub background: Option<Color>,
}

impl KeyHintBarStyle {
    pub fn footer_bar() -> Self {
        Self {
            key_style: Style::default().fg(TEXT_PRIMARY).bg(KEY_HINT_BG),
            action_style: Style::default().fg(TEXT_MUTED),
            item_gap: "   ",
            leading: " ",
            alignment: Alignment::Left,
            background: Some(FOOTER_BG),
        }
    }
}

/// Footer actions, in display order, with their short labels
const FOOTER_ACTIONS: &[(Action, &str)] = &[
    (Action::StepBack, "prev"),
    (Action::StepForward, "next"),
    (Action::JumpToLive, "live"),
    (Action::CycleRenderMode, "mode"),
    (Action::ToggleHelp, "help"),
    (Action::Quit, "quit"),
];

/// First bound key for each footer action. Unbound actions are skipped.
pub fn footer_hints(config: &KeybindingConfig) -> Vec<(String, &'static str)> {
    FOOTER_ACTIONS
        .iter()
        .filter_map(|(action, label)| {
            config
                .keys_for(*action)
                .into_iter()
                .next()
                .map(|key| (key, *label))
        })
        .collect()
}

pub fn render_key_hints(
    area: Rect,
    buf: &mut Buffer,
    hints: &[(String, &str)],
    style: KeyHintBarStyle,
) {
    let mut spans = Vec::new();
    if !style.leading.is_empty() {
        spans.push(Span::raw(style.leading));
    }
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 && !style.item_gap.is_empty() {
            spans.push(Span::raw(style.item_gap));
        }
        spans.push(Span::styled(format!(" {key} "), style.key_style));
        spans.push(Span::styled(format!(" {action}"), style.action_style));
    }

    let mut paragraph = Paragraph::new(Line::from(spans)).alignment(style.alignment);
    if let Some(bg) = style.background {
        paragraph = paragraph.style(Style::default().bg(bg));
    }
    paragraph.render(area, buf);
}
