//! Timeline model, point index and playback controller

pub mod controller;
pub mod drag;
pub mod index;
pub mod point;

pub use controller::{FollowPolicy, PlaybackController, SelectionChange};
pub use drag::{CaptureScope, DragGuard, PointerGrab};
pub use index::{PointIndex, PointKey};
pub use point::{CursorPos, ImageRef, PointKind, PointerButton, TimelinePoint, Viewport};
