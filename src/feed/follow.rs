//! Live tailing of a tape file

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;

use super::tape::{parse_line, TapeLine};
use super::{FeedError, FeedUpdate};
use crate::timeline::TimelinePoint;

/// Incremental reader over a growing tape.
///
/// Keeps the byte offset already consumed, the unterminated tail and the
/// accumulated points, so each poll only reads what was appended.
#[derive(Debug)]
pub struct TapeFollower {
    path: PathBuf,
    offset: u64,
    partial: Vec<u8>,
    line: usize,
    points: Vec<TimelinePoint>,
}

impl TapeFollower {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            partial: Vec::new(),
            line: 0,
            points: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn points(&self) -> &[TimelinePoint] {
        &self.points
    }

    /// Read whatever was appended since the last poll.
    ///
    /// A file that shrank was rewritten and yields a `Reset` first. A file
    /// that does not exist yet yields nothing.
    pub fn poll(&mut self) -> Result<Vec<FeedUpdate>, FeedError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(FeedError::io(&self.path, e)),
        };
        let len = file
            .metadata()
            .map_err(|e| FeedError::io(&self.path, e))?
            .len();

        let mut updates = Vec::new();
        if len < self.offset {
            tracing::info!(path = %self.path.display(), "Tape truncated, starting over");
            self.restart();
            updates.push(FeedUpdate::Reset);
        }
        if len == self.offset {
            return Ok(updates);
        }

        file.seek(SeekFrom::Start(self.offset))
            .map_err(|e| FeedError::io(&self.path, e))?;
        let mut appended = Vec::new();
        file.read_to_end(&mut appended)
            .map_err(|e| FeedError::io(&self.path, e))?;
        self.offset += appended.len() as u64;
        self.partial.extend_from_slice(&appended);

        let mut dirty = false;
        while let Some(newline) = self.partial.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=newline).collect();
            self.line += 1;
            let text = String::from_utf8_lossy(&raw);
            match parse_line(self.line, &text) {
                Ok(Some(TapeLine::Point(point))) => {
                    self.points.push(point);
                    dirty = true;
                }
                Ok(Some(TapeLine::Reset)) => {
                    self.points.clear();
                    dirty = false;
                    updates.push(FeedUpdate::Reset);
                }
                Ok(Some(TapeLine::Header { .. })) | Ok(None) => {}
                Err(e @ FeedError::UnsupportedSchema(_)) => return Err(e),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Skipping tape line"
                ),
            }
        }

        if dirty {
            updates.push(FeedUpdate::Points(self.points.clone()));
        }
        Ok(updates)
    }

    fn restart(&mut self) {
        self.offset = 0;
        self.partial.clear();
        self.line = 0;
        self.points.clear();
    }
}

/// Tail `path` every `poll_interval`, pushing the full point list whenever it
/// grows. Returns when the receiver is dropped.
pub async fn follow_tape(
    path: PathBuf,
    poll_interval: Duration,
    tx: mpsc::Sender<FeedUpdate>,
) -> Result<(), FeedError> {
    let mut follower = TapeFollower::new(path);
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    tracing::info!(path = %follower.path().display(), "Following tape");
    loop {
        ticker.tick().await;
        let updates = match follower.poll() {
            Ok(updates) => updates,
            Err(e @ FeedError::UnsupportedSchema(_)) => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Tape poll failed");
                continue;
            }
        };
        for update in updates {
            if tx.send(update).await.is_err() {
                tracing::debug!("Feed receiver dropped, stopping follow");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;
    use tempfile::tempdir;

    fn append(path: &Path, text: &str) {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    fn point_count(update: &FeedUpdate) -> usize {
        match update {
            FeedUpdate::Points(points) => points.len(),
            FeedUpdate::Reset => 0,
        }
    }

    #[test]
    fn missing_file_is_quiet() {
        let dir = tempdir().unwrap();
        let mut follower = TapeFollower::new(dir.path().join("later.jsonl"));
        assert!(follower.poll().unwrap().is_empty());
    }

    #[test]
    fn growth_pushes_full_list() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tape.jsonl");
        let mut follower = TapeFollower::new(&path);

        append(&path, "{\"type\":\"point\",\"time\":1}\n{\"type\":\"point\",\"time\":2}\n");
        let updates = follower.poll().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(point_count(&updates[0]), 2);

        assert!(follower.poll().unwrap().is_empty());

        append(&path, "{\"type\":\"point\",\"time\":3}\n");
        let updates = follower.poll().unwrap();
        assert_eq!(point_count(&updates[0]), 3);
    }

    #[test]
    fn partial_line_waits_for_newline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tape.jsonl");
        let mut follower = TapeFollower::new(&path);

        append(&path, "{\"type\":\"point\",");
        assert!(follower.poll().unwrap().is_empty());
        append(&path, "\"time\":5}\n");
        let updates = follower.poll().unwrap();
        assert_eq!(point_count(&updates[0]), 1);
        assert_eq!(follower.points()[0].time, 5.0);
    }

    #[test]
    fn reset_line_clears_points() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tape.jsonl");
        let mut follower = TapeFollower::new(&path);

        append(
            &path,
            "{\"type\":\"point\",\"time\":1}\n{\"type\":\"reset\"}\n{\"type\":\"point\",\"time\":9}\n",
        );
        let updates = follower.poll().unwrap();
        assert_eq!(updates[0], FeedUpdate::Reset);
        assert_eq!(point_count(&updates[1]), 1);
        assert_eq!(updates.len(), 2);
    }

    #[test]
    fn truncation_starts_over() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tape.jsonl");
        let mut follower = TapeFollower::new(&path);

        append(&path, "{\"type\":\"point\",\"time\":1}\n{\"type\":\"point\",\"time\":2}\n");
        follower.poll().unwrap();

        std::fs::write(&path, "{\"type\":\"point\",\"time\":8}\n").unwrap();
        let updates = follower.poll().unwrap();
        assert_eq!(updates[0], FeedUpdate::Reset);
        assert_eq!(point_count(&updates[1]), 1);
    }

    #[tokio::test]
    async fn follow_task_sends_updates_until_receiver_drops() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tape.jsonl");
        append(&path, "{\"type\":\"point\",\"time\":1}\n");

        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn(follow_tape(path.clone(), Duration::from_millis(5), tx));

        let first = rx.recv().await.unwrap();
        assert_eq!(point_count(&first), 1);

        append(&path, "{\"type\":\"point\",\"time\":2}\n");
        let second = rx.recv().await.unwrap();
        assert_eq!(point_count(&second), 2);

        drop(rx);
        append(&path, "{\"type\":\"point\",\"time\":3}\n");
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
