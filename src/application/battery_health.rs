// Battery health calculations - DoD, cycle life, coulomb-counting SOH
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::daily::{DailyDischarge, DailyStat};
use crate::domain::health::{
    round2, BatteryStatus, CycleEstimate, CycleStrategy, DischargeReport, SohEstimate,
};
use crate::domain::series::{SamplePoint, Series};

#[derive(Debug, Error)]
pub enum HealthError {
    /// The integration window holds no current samples. Callers recover this
    /// into a warning-shaped result instead of failing the analysis.
    #[error("no current samples within the integration window")]
    EmptyWindow,
    #[error("{0} must be positive")]
    InvalidParameter(&'static str),
    #[error("no daily statistics to analyze")]
    NoDailyData,
}

/// Depth of discharge for one day, relative to the full-charge voltage.
/// Not floored at zero; a day that never dipped below full charge simply
/// reports a negative DoD.
pub fn depth_of_discharge(full_charge_voltage: f64, min_voltage: f64) -> f64 {
    round2((full_charge_voltage - min_voltage) / full_charge_voltage * 100.0)
}

/// Build the daily discharge table and its summary from aggregated voltage
/// statistics.
pub fn discharge_report(
    daily: &[DailyStat],
    full_charge_voltage: f64,
) -> Result<DischargeReport, HealthError> {
    if full_charge_voltage <= 0.0 {
        return Err(HealthError::InvalidParameter("full charge voltage"));
    }
    if daily.is_empty() {
        return Err(HealthError::NoDailyData);
    }

    let rows: Vec<DailyDischarge> = daily
        .iter()
        .map(|stat| DailyDischarge {
            date: stat.date,
            min_voltage: stat.min,
            max_voltage: stat.max,
            avg_voltage: stat.mean,
            dod_percent: depth_of_discharge(full_charge_voltage, stat.min),
        })
        .collect();

    let avg = round2(rows.iter().map(|r| r.dod_percent).sum::<f64>() / rows.len() as f64);
    let max = rows
        .iter()
        .map(|r| r.dod_percent)
        .fold(f64::NEG_INFINITY, f64::max);
    let min = rows
        .iter()
        .map(|r| r.dod_percent)
        .fold(f64::INFINITY, f64::min);

    Ok(DischargeReport {
        daily: rows,
        avg_dod_percent: avg,
        max_dod_percent: max,
        min_dod_percent: min,
        status: BatteryStatus::from_avg_dod(avg),
    })
}

/// Estimate cycle life from the discharge summary. One cycle is consumed per
/// calendar day with valid data.
pub fn cycle_estimate(report: &DischargeReport, strategy: CycleStrategy) -> CycleEstimate {
    let total = strategy.total_cycles(report.avg_dod_percent);
    let days = report.daily.len();
    let remaining = round2(total - days as f64).max(0.0);
    let lifecycle = if total > 0.0 {
        round2(remaining / total * 100.0)
    } else {
        0.0
    };

    CycleEstimate {
        strategy,
        avg_dod_percent: report.avg_dod_percent,
        total_cycles: total,
        days_with_data: days,
        remaining_cycles: remaining,
        lifecycle_percent: lifecycle,
    }
}

/// Inclusive coulomb-counting window.
#[derive(Debug, Clone, Copy)]
pub struct IntegrationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Default window spanning whole UTC days: midnight of the series' earliest
/// date to the last microsecond of its latest date.
pub fn default_window(series: &Series) -> Option<IntegrationWindow> {
    let (first, last) = series.date_bounds()?;
    Some(IntegrationWindow {
        start: first.and_hms_opt(0, 0, 0)?.and_utc(),
        end: last.and_hms_micro_opt(23, 59, 59, 999_999)?.and_utc(),
    })
}

/// State of health via coulomb counting: integrate current over the window
/// and compare the accumulated amp-hours against the nominal capacity.
///
/// The integration is a left-rectangle sum: each sample's current is applied
/// over the interval since the previous sample, and the first sample
/// contributes nothing.
pub fn state_of_health(
    current: &Series,
    window: &IntegrationWindow,
    nominal_capacity_ah: f64,
) -> Result<SohEstimate, HealthError> {
    if nominal_capacity_ah <= 0.0 {
        return Err(HealthError::InvalidParameter("nominal capacity"));
    }

    let mut samples: Vec<SamplePoint> = current
        .points
        .iter()
        .copied()
        .filter(|p| p.timestamp >= window.start && p.timestamp <= window.end)
        .collect();
    if samples.is_empty() {
        return Err(HealthError::EmptyWindow);
    }
    samples.sort_by_key(|p| p.timestamp);

    let mut accumulated_ah = 0.0;
    let mut previous = samples[0].timestamp;
    for point in &samples {
        let dt_hours = (point.timestamp - previous).num_milliseconds() as f64 / 3_600_000.0;
        accumulated_ah += point.value * dt_hours;
        previous = point.timestamp;
    }

    let actual_capacity_ah = accumulated_ah.abs();
    Ok(SohEstimate {
        window_start: window.start,
        window_end: window.end,
        samples_integrated: samples.len(),
        actual_capacity_ah,
        nominal_capacity_ah,
        soh_percent: actual_capacity_ah / nominal_capacity_ah * 100.0,
    })
}
