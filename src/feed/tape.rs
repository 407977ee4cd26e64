use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::FeedError;
use crate::timeline::TimelinePoint;

pub const TAPE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum TapeLine {
    Header {
        schema_version: u32,
        created_at_ms: i64,
    },
    Point(TimelinePoint),
    Reset,
}

/// Parse one JSONL line. `line` is 1-based. Blank lines yield `None`.
pub(crate) fn parse_line(line: usize, raw: &str) -> Result<Option<TapeLine>, FeedError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let parsed: TapeLine =
        serde_json::from_str(raw).map_err(|source| FeedError::Parse { line, source })?;
    if let TapeLine::Header { schema_version, .. } = &parsed {
        if line != 1 {
            return Err(FeedError::MisplacedHeader(line));
        }
        if *schema_version > TAPE_SCHEMA_VERSION {
            return Err(FeedError::UnsupportedSchema(*schema_version));
        }
    }
    Ok(Some(parsed))
}

#[derive(Debug, Clone, PartialEq)]
pub enum TapeEvent {
    Point(TimelinePoint),
    Reset,
}

/// A tape read in full
#[derive(Debug, Clone)]
pub struct Tape {
    pub schema_version: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub events: Vec<TapeEvent>,
}

impl Tape {
    /// Points recorded after the last reset
    pub fn points(&self) -> Vec<TimelinePoint> {
        let start = self
            .events
            .iter()
            .rposition(|e| matches!(e, TapeEvent::Reset))
            .map_or(0, |i| i + 1);
        self.events[start..]
            .iter()
            .filter_map(|e| match e {
                TapeEvent::Point(point) => Some(point.clone()),
                TapeEvent::Reset => None,
            })
            .collect()
    }
}

/// Read a whole tape. Malformed lines are skipped with a warning; only I/O
/// failures and tapes from a newer schema are errors.
pub fn read_tape(path: &Path) -> Result<Tape, FeedError> {
    let file = File::open(path).map_err(|e| FeedError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut tape = Tape {
        schema_version: TAPE_SCHEMA_VERSION,
        created_at: None,
        events: Vec::new(),
    };

    // Split on raw bytes so one line of bad UTF-8 cannot fail the whole tape
    for (idx, raw) in reader.split(b'\n').enumerate() {
        let raw = raw.map_err(|e| FeedError::io(path, e))?;
        let line = String::from_utf8_lossy(&raw);
        match parse_line(idx + 1, &line) {
            Ok(Some(TapeLine::Header {
                schema_version,
                created_at_ms,
            })) => {
                tape.schema_version = schema_version;
                tape.created_at = Utc.timestamp_millis_opt(created_at_ms).single();
            }
            Ok(Some(TapeLine::Point(point))) => tape.events.push(TapeEvent::Point(point)),
            Ok(Some(TapeLine::Reset)) => tape.events.push(TapeEvent::Reset),
            Ok(None) => {}
            Err(e @ FeedError::UnsupportedSchema(_)) => return Err(e),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping tape line"),
        }
    }

    tracing::debug!(
        path = %path.display(),
        events = tape.events.len(),
        "Tape loaded"
    );
    Ok(tape)
}

/// Append-only tape producer
pub struct TapeWriter {
    path: PathBuf,
    created_at_ms: i64,
    writer: Mutex<BufWriter<File>>,
}

impl TapeWriter {
    /// Create (or truncate) `path` and write the header line
    pub fn create(path: &Path) -> Result<Self, FeedError> {
        let file = File::create(path).map_err(|e| FeedError::io(path, e))?;
        let created_at_ms = Utc::now().timestamp_millis();
        let writer = Self {
            path: path.to_path_buf(),
            created_at_ms,
            writer: Mutex::new(BufWriter::new(file)),
        };
        writer.write_line(&TapeLine::Header {
            schema_version: TAPE_SCHEMA_VERSION,
            created_at_ms,
        })?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    pub fn append_point(&self, point: &TimelinePoint) -> Result<(), FeedError> {
        self.write_line(&TapeLine::Point(point.clone()))
    }

    pub fn append_reset(&self) -> Result<(), FeedError> {
        self.write_line(&TapeLine::Reset)
    }

    /// Lines are flushed one at a time so followers never wait on a buffer.
    fn write_line(&self, line: &TapeLine) -> Result<(), FeedError> {
        let json = serde_json::to_string(line)?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{json}").map_err(|e| FeedError::io(&self.path, e))?;
        writer.flush().map_err(|e| FeedError::io(&self.path, e))?;
        Ok(())
    }
}
