//! Shared test utilities for the timeline viewer
//!
//! - Point fixtures and tape files
//! - TUI terminal testing helpers

#![allow(dead_code)]

pub mod fixtures;
pub mod terminal;
