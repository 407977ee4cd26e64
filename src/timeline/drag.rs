//! Pointer capture for scrub drags.
//!
//! A drag grabs pointer move/release events at the widest scope the host
//! offers so that dragging keeps working once the pointer leaves the track.
//! The grab is held by a [`DragGuard`] which releases it exactly once, on
//! explicit release or on drop, whichever comes first.

use std::cell::Cell;
use std::rc::Rc;

/// Source of pointer grabs (window, document, whole terminal...)
pub trait CaptureScope {
    /// Start routing all pointer moves/releases to the drag owner
    fn acquire(&self) -> DragGuard;
}

/// Guard that releases the pointer grab when dropped.
pub struct DragGuard {
    release: Option<Box<dyn FnOnce()>>,
}

impl DragGuard {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Guard for hosts with no capture primitive
    pub fn detached() -> Self {
        Self { release: None }
    }

    /// Release now. Drop becomes a no-op afterwards.
    pub fn release(mut self) {
        self.do_release();
    }

    fn do_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for DragGuard {
    fn drop(&mut self) {
        self.do_release();
    }
}

impl std::fmt::Debug for DragGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragGuard")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// App-wide grab flag.
///
/// The terminal host checks [`is_grabbed`](Self::is_grabbed) to route every
/// mouse drag/up event to the scrub track regardless of where it lands.
#[derive(Debug, Clone, Default)]
pub struct PointerGrab {
    grabbed: Rc<Cell<bool>>,
}

impl PointerGrab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed.get()
    }
}

impl CaptureScope for PointerGrab {
    fn acquire(&self) -> DragGuard {
        if self.grabbed.replace(true) {
            tracing::debug!("Pointer grab acquired while already held");
        }
        let grabbed = Rc::clone(&self.grabbed);
        DragGuard::new(move || grabbed.set(false))
    }
}
