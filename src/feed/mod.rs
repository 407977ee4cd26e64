//! Point sources for the viewer.
//!
//! Producers hand the engine the full point list on every change. Here that
//! list comes from a JSONL tape file, read once or tailed while it grows.

pub mod follow;
pub mod tape;

pub use follow::{follow_tape, TapeFollower};
pub use tape::{read_tape, Tape, TapeEvent, TapeWriter, TAPE_SCHEMA_VERSION};

use std::path::PathBuf;

use thiserror::Error;

use crate::timeline::TimelinePoint;

/// Message from a feed task to the UI task
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    /// Complete current point list
    Points(Vec<TimelinePoint>),
    /// The producer started over; drop all state
    Reset,
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to access tape {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid tape line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Tape header found on line {0}, expected on line 1")]
    MisplacedHeader(usize),

    #[error("Unsupported tape schema version {0}")]
    UnsupportedSchema(u32),

    #[error("Failed to encode tape line: {0}")]
    Encode(#[from] serde_json::Error),
}

impl FeedError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FeedError::Io {
            path: path.into(),
            source,
        }
    }
}
