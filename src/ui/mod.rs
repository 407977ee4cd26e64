pub mod action;
pub mod app;
pub mod components;
pub mod events;
pub mod terminal_guard;
pub mod viewer;

pub use action::Action;
pub use app::{App, TapeSource};
pub use events::AppEvent;
pub use terminal_guard::{install_panic_hook, TerminalGuard};
pub use viewer::Viewer;
