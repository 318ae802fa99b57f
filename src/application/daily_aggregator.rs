// Daily aggregation - per-date statistics for one series
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::daily::DailyStat;
use crate::domain::series::Series;

/// Group samples by UTC calendar date and compute min, max and arithmetic
/// mean per day. Output is ordered by ascending date; days without samples
/// produce no row and nothing is interpolated across gaps.
pub fn aggregate_daily(series: &Series) -> Vec<DailyStat> {
    let mut groups: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for point in &series.points {
        groups
            .entry(point.timestamp.date_naive())
            .or_default()
            .push(point.value);
    }

    groups
        .into_iter()
        .map(|(date, values)| {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            DailyStat::new(date, min, max, mean)
        })
        .collect()
}
