//! Sorted point index
//!
//! The feed pushes full point lists in arrival order. The index keeps its own
//! time-sorted copy and answers the positional queries the controller and the
//! scrub track need. Every update re-sorts from scratch.

use super::point::TimelinePoint;

/// Stable identity of a point inside the index.
///
/// Two points are the same point if they share a timestamp and their rank
/// among points with that timestamp. Unlike a plain index this survives
/// insertion of earlier points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey {
    time_bits: u64,
    ordinal: u32,
}

impl PointKey {
    pub fn time(&self) -> f64 {
        f64::from_bits(self.time_bits)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PointIndex {
    points: Vec<TimelinePoint>,
}

impl PointIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a caller-owned list without touching it
    pub fn from_points(points: &[TimelinePoint]) -> Self {
        let mut index = Self::new();
        index.update(points);
        index
    }

    /// Replace the indexed set with a sorted copy of `points`.
    ///
    /// Points with a missing or non-finite time take their list position as
    /// time. The sort is stable, so equal times keep arrival order.
    pub fn update(&mut self, points: &[TimelinePoint]) {
        let mut sorted: Vec<TimelinePoint> = points
            .iter()
            .enumerate()
            .map(|(position, point)| {
                let mut point = point.clone();
                if !point.time.is_finite() {
                    tracing::debug!(position, "Point without usable time, using position");
                    point.time = position as f64;
                }
                point
            })
            .collect();
        sorted.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.points = sorted;
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[TimelinePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimelinePoint> {
        self.points.get(index)
    }

    pub fn newest_index(&self) -> Option<usize> {
        self.points.len().checked_sub(1)
    }

    pub fn start_time(&self) -> Option<f64> {
        self.points.first().map(|p| p.time)
    }

    pub fn end_time(&self) -> Option<f64> {
        self.points.last().map(|p| p.time)
    }

    pub fn key_of(&self, index: usize) -> Option<PointKey> {
        let point = self.points.get(index)?;
        let ordinal = self.points[..index]
            .iter()
            .rev()
            .take_while(|p| p.time == point.time)
            .count();
        Some(PointKey {
            time_bits: point.time.to_bits(),
            ordinal: ordinal as u32,
        })
    }

    pub fn position_of(&self, key: PointKey) -> Option<usize> {
        let time = key.time();
        let first = self.points.partition_point(|p| p.time < time);
        let index = first + key.ordinal as usize;
        (self.points.get(index)?.time == time).then_some(index)
    }

    /// Index of the point closest to `target`.
    ///
    /// Exact ties go to the later point. Among points sharing a timestamp the
    /// last one in arrival order wins.
    pub fn nearest(&self, target: f64) -> Option<usize> {
        if self.points.is_empty() || target.is_nan() {
            return None;
        }
        let upper = self.points.partition_point(|p| p.time < target);
        let above = (upper < self.points.len()).then(|| {
            let time = self.points[upper].time;
            upper + self.points[upper..].partition_point(|p| p.time <= time) - 1
        });
        let below = upper.checked_sub(1);

        match (below, above) {
            (Some(lo), Some(hi)) => {
                let d_lo = (target - self.points[lo].time).abs();
                let d_hi = (self.points[hi].time - target).abs();
                Some(if d_hi <= d_lo { hi } else { lo })
            }
            (Some(lo), None) => Some(lo),
            (None, hi) => hi,
        }
    }

    fn span(&self) -> Option<(f64, f64)> {
        let start = self.start_time()?;
        let end = self.end_time()?;
        Some((start, (end - start).max(1.0)))
    }

    /// Track position of `time` in percent, clamped to `[0, 100]`
    pub fn percent(&self, time: f64) -> f64 {
        match self.span() {
            Some((start, span)) => ((time - start) / span * 100.0).clamp(0.0, 100.0),
            None => 0.0,
        }
    }

    /// Time under a track position. Callers snap the result with [`nearest`](Self::nearest).
    pub fn time_at_percent(&self, percent: f64) -> Option<f64> {
        let (start, span) = self.span()?;
        Some(start + percent.clamp(0.0, 100.0) / 100.0 * span)
    }

    /// Latest point at or before `hover`, only while hovering strictly
    /// before `current_time`.
    pub fn hover_preview(&self, hover: f64, current_time: f64) -> Option<usize> {
        if hover.is_nan() || hover >= current_time {
            return None;
        }
        self.points
            .partition_point(|p| p.time <= hover)
            .checked_sub(1)
    }

    /// Points sharing `session_id`, in time order
    pub fn session_points<'a>(
        &'a self,
        session_id: Option<&'a str>,
    ) -> impl Iterator<Item = &'a TimelinePoint> + 'a {
        self.points
            .iter()
            .filter(move |p| p.session_id.as_deref() == session_id)
    }
}
