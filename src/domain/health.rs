// Battery health domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::daily::DailyDischarge;

/// Round to two decimal places, the precision every derived report value
/// uses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Empirical degradation curve mapping average DoD to total usable cycles.
/// Both curves are preserved as selectable strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStrategy {
    Linear,
    Quadratic,
}

impl CycleStrategy {
    /// Total usable cycles predicted for an average DoD, clamped at zero.
    pub fn total_cycles(&self, avg_dod: f64) -> f64 {
        let raw = match self {
            CycleStrategy::Linear => -9.0 * avg_dod + 1180.0,
            CycleStrategy::Quadratic => 0.0622 * avg_dod * avg_dod - 19.599 * avg_dod + 1461.6,
        };
        round2(raw).max(0.0)
    }
}

/// Qualitative battery condition bands over the average DoD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl BatteryStatus {
    pub fn from_avg_dod(avg_dod: f64) -> Self {
        if avg_dod < 30.0 {
            BatteryStatus::Excellent
        } else if avg_dod < 50.0 {
            BatteryStatus::Good
        } else if avg_dod < 70.0 {
            BatteryStatus::Fair
        } else if avg_dod < 85.0 {
            BatteryStatus::Poor
        } else {
            BatteryStatus::Critical
        }
    }
}

/// Daily depth-of-discharge rows plus their summary statistics.
#[derive(Debug, Clone, Serialize)]
pub struct DischargeReport {
    pub daily: Vec<DailyDischarge>,
    pub avg_dod_percent: f64,
    pub max_dod_percent: f64,
    pub min_dod_percent: f64,
    pub status: BatteryStatus,
}

/// Cycle-life estimate derived from the discharge report. One cycle is
/// consumed per calendar day with valid data.
#[derive(Debug, Clone, Serialize)]
pub struct CycleEstimate {
    pub strategy: CycleStrategy,
    pub avg_dod_percent: f64,
    pub total_cycles: f64,
    pub days_with_data: usize,
    pub remaining_cycles: f64,
    pub lifecycle_percent: f64,
}

/// Coulomb-counting result: an estimate, or a recovered warning when the
/// integration window holds no samples.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SohOutcome {
    Estimated(SohEstimate),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SohEstimate {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub samples_integrated: usize,
    pub actual_capacity_ah: f64,
    pub nominal_capacity_ah: f64,
    pub soh_percent: f64,
}

/// Battery section of an analysis: produced only when the export contains a
/// battery voltage series.
#[derive(Debug, Clone, Serialize)]
pub struct BatteryReport {
    pub discharge: DischargeReport,
    pub cycles: CycleEstimate,
    pub soh: SohOutcome,
}

/// Sample-count reduction for one metric between the full and sampled
/// exports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricCompression {
    pub full_count: usize,
    pub sample_count: usize,
    pub compression_percent: f64,
}

/// Remaining-cycle estimates computed independently for both exports, and
/// the discrepancy the sampling introduced.
#[derive(Debug, Clone, Serialize)]
pub struct RemainingComparison {
    pub strategy: CycleStrategy,
    pub reference_voltage: f64,
    pub full_remaining_cycles: f64,
    pub sample_remaining_cycles: f64,
    pub absolute_error: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub metrics: BTreeMap<String, MetricCompression>,
    pub remaining: RemainingComparison,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_strategy() {
        assert_eq!(CycleStrategy::Linear.total_cycles(50.0), 730.0);
    }

    #[test]
    fn test_quadratic_strategy() {
        assert_eq!(CycleStrategy::Quadratic.total_cycles(50.0), 637.15);
    }

    #[test]
    fn test_total_cycles_clamped_at_zero() {
        // A DoD far beyond the curve's root would go negative without the clamp.
        assert_eq!(CycleStrategy::Linear.total_cycles(200.0), 0.0);
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(BatteryStatus::from_avg_dod(10.0), BatteryStatus::Excellent);
        assert_eq!(BatteryStatus::from_avg_dod(30.0), BatteryStatus::Good);
        assert_eq!(BatteryStatus::from_avg_dod(55.0), BatteryStatus::Fair);
        assert_eq!(BatteryStatus::from_avg_dod(70.0), BatteryStatus::Poor);
        assert_eq!(BatteryStatus::from_avg_dod(85.0), BatteryStatus::Critical);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.076923), 3.08);
        assert_eq!(round2(90.004), 90.0);
    }
}
