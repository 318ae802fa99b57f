// Time-series domain models
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// One named metric reconstructed from a log export. Timestamps are
/// normalized to UTC at parse time; input order is preserved and is not
/// guaranteed to be chronological.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub points: Vec<SamplePoint>,
}

impl Series {
    pub fn new(name: String, points: Vec<SamplePoint>) -> Self {
        Self { name, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Copy of the points ordered by timestamp ascending.
    pub fn sorted_points(&self) -> Vec<SamplePoint> {
        let mut points = self.points.clone();
        points.sort_by_key(|p| p.timestamp);
        points
    }

    /// Earliest and latest UTC calendar dates covered by this series.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.points.iter().map(|p| p.timestamp).min()?;
        let last = self.points.iter().map(|p| p.timestamp).max()?;
        Some((first.date_naive(), last.date_naive()))
    }
}
