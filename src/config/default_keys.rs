//! Bindings used when the config file does not override them

use super::keys::KeybindingConfig;
use crate::ui::action::Action;

const DEFAULT_BINDINGS: &[(&str, Action)] = &[
    ("q", Action::Quit),
    ("C-c", Action::Quit),
    ("?", Action::ToggleHelp),
    // Playhead
    ("<Left>", Action::StepBack),
    ("h", Action::StepBack),
    ("<Right>", Action::StepForward),
    ("l", Action::StepForward),
    ("S-<Left>", Action::StepBackMany),
    ("H", Action::StepBackMany),
    ("S-<Right>", Action::StepForwardMany),
    ("L", Action::StepForwardMany),
    ("<Home>", Action::JumpToStart),
    ("0", Action::JumpToStart),
    ("<End>", Action::JumpToLive),
    ("$", Action::JumpToLive),
    // View
    ("m", Action::CycleRenderMode),
    ("]", Action::NextProposal),
    ("[", Action::PrevProposal),
    // Scrolling
    ("<Up>", Action::ScrollUp),
    ("k", Action::ScrollUp),
    ("<Down>", Action::ScrollDown),
    ("j", Action::ScrollDown),
    ("<PageUp>", Action::ScrollPageUp),
    ("C-u", Action::ScrollPageUp),
    ("<PageDown>", Action::ScrollPageDown),
    ("C-d", Action::ScrollPageDown),
    ("g", Action::ScrollToTop),
    ("G", Action::ScrollToBottom),
];

pub fn default_keybindings() -> KeybindingConfig {
    let mut config = KeybindingConfig::new();
    for (notation, action) in DEFAULT_BINDINGS {
        if let Err(e) = config.bind(notation, *action) {
            tracing::error!(notation, error = %e, "Invalid default key binding");
        }
    }
    config
}
