//! Actions that can be bound to keys

use serde::{Deserialize, Serialize};

/// All mappable viewer actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Quit,
    ToggleHelp,

    // ========== Playhead ==========
    /// One point back
    StepBack,
    /// One point forward
    StepForward,
    /// `step_size` points back
    StepBackMany,
    /// `step_size` points forward
    StepForwardMany,
    JumpToStart,
    /// Return to the newest point and resume following
    JumpToLive,

    // ========== View ==========
    /// Auto -> frame -> console -> proposals -> auto
    CycleRenderMode,
    NextProposal,
    PrevProposal,

    // ========== Scrolling ==========
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollToTop,
    ScrollToBottom,
}

impl Action {
    /// Name used in the `[keys]` config table
    pub fn name(self) -> &'static str {
        match self {
            Action::Quit => "quit",
            Action::ToggleHelp => "toggle_help",
            Action::StepBack => "step_back",
            Action::StepForward => "step_forward",
            Action::StepBackMany => "step_back_many",
            Action::StepForwardMany => "step_forward_many",
            Action::JumpToStart => "jump_to_start",
            Action::JumpToLive => "jump_to_live",
            Action::CycleRenderMode => "cycle_render_mode",
            Action::NextProposal => "next_proposal",
            Action::PrevProposal => "prev_proposal",
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::ScrollPageUp => "scroll_page_up",
            Action::ScrollPageDown => "scroll_page_down",
            Action::ScrollToTop => "scroll_to_top",
            Action::ScrollToBottom => "scroll_to_bottom",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Action::Quit => "Quit",
            Action::ToggleHelp => "Toggle this help",
            Action::StepBack => "Previous point",
            Action::StepForward => "Next point",
            Action::StepBackMany => "Jump back",
            Action::StepForwardMany => "Jump forward",
            Action::JumpToStart => "First point",
            Action::JumpToLive => "Back to live",
            Action::CycleRenderMode => "Cycle view mode",
            Action::NextProposal => "Next proposal",
            Action::PrevProposal => "Previous proposal",
            Action::ScrollUp => "Scroll up",
            Action::ScrollDown => "Scroll down",
            Action::ScrollPageUp => "Page up",
            Action::ScrollPageDown => "Page down",
            Action::ScrollToTop => "Scroll to top",
            Action::ScrollToBottom => "Scroll to bottom",
        }
    }

    pub fn all() -> &'static [Action] {
        &[
            Action::StepBack,
            Action::StepForward,
            Action::StepBackMany,
            Action::StepForwardMany,
            Action::JumpToStart,
            Action::JumpToLive,
            Action::CycleRenderMode,
            Action::PrevProposal,
            Action::NextProposal,
            Action::ScrollUp,
            Action::ScrollDown,
            Action::ScrollPageUp,
            Action::ScrollPageDown,
            Action::ScrollToTop,
            Action::ScrollToBottom,
            Action::ToggleHelp,
            Action::Quit,
        ]
    }

    /// Parse a config action name
    pub fn from_name(name: &str) -> Option<Action> {
        Action::all().iter().copied().find(|a| a.name() == name)
    }
}
