pub mod config;
pub mod feed;
pub mod render;
pub mod replay;
pub mod timeline;
pub mod ui;
pub mod util;

pub use config::Config;
pub use feed::{FeedError, FeedUpdate, TapeWriter};
pub use render::{Presenter, RenderMode};
pub use replay::{ReplaySurface, TerminalReplay, TextBuffer};
pub use timeline::{FollowPolicy, PlaybackController, PointIndex, TimelinePoint};
pub use ui::{App, TapeSource, Viewer};
