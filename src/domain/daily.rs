// Daily aggregation domain models
use chrono::NaiveDate;
use serde::Serialize;

/// Per-day statistics for one metric, grouped on the UTC calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl DailyStat {
    pub fn new(date: NaiveDate, min: f64, max: f64, mean: f64) -> Self {
        Self {
            date,
            min,
            max,
            mean,
        }
    }
}

/// One row of the daily battery table: the day's voltage statistics plus the
/// depth-of-discharge derived from them. The DoD is not floored at zero here;
/// only the cycle counts downstream are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyDischarge {
    pub date: NaiveDate,
    pub min_voltage: f64,
    pub max_voltage: f64,
    pub avg_voltage: f64,
    pub dod_percent: f64,
}
