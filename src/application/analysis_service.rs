// Analysis service - Use case for analyzing one log export
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::application::battery_health::{self, HealthError, IntegrationWindow};
use crate::application::daily_aggregator::aggregate_daily;
use crate::domain::health::{BatteryReport, CycleStrategy, SohOutcome};
use crate::domain::series::Series;
use crate::infrastructure::config::AnalysisDefaults;
use crate::infrastructure::log_parser::{self, ParseError, ParseOptions};

pub const BATTERY_VOLTAGE_SERIES: &str = "Voltage-Battery";
pub const BATTERY_CURRENT_SERIES: &str = "Current-Battery";

/// Per-request parameter overrides; anything unset falls back to the
/// configured defaults.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub full_charge_voltage: Option<f64>,
    pub cycle_strategy: Option<CycleStrategy>,
    pub nominal_capacity_ah: Option<f64>,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub drop_first_sample: Option<bool>,
}

/// Everything derived from one document: the reconstructed series plus the
/// battery section, which is present only when the export carries a battery
/// voltage series.
#[derive(Debug, Clone)]
pub struct DocumentAnalysis {
    pub series: BTreeMap<String, Series>,
    pub battery: Option<BatteryReport>,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Every entry in the export was skipped; there is nothing to analyze.
    #[error("no valid data series found in the document")]
    NoSeries,
    #[error(transparent)]
    Health(#[from] HealthError),
}

/// Runs the parse -> aggregate -> health pipeline for one document. Every
/// call is a pure function of the document and its parameters; nothing is
/// cached or shared between requests.
#[derive(Clone)]
pub struct AnalysisService {
    defaults: AnalysisDefaults,
}

impl AnalysisService {
    pub fn new(defaults: AnalysisDefaults) -> Self {
        Self { defaults }
    }

    pub fn analyze(
        &self,
        document: &[u8],
        request: &AnalysisRequest,
    ) -> Result<DocumentAnalysis, AnalysisError> {
        let options = ParseOptions {
            drop_first_sample: request
                .drop_first_sample
                .unwrap_or(self.defaults.drop_first_sample),
        };

        let series = log_parser::parse(document, options)?;
        if series.is_empty() {
            return Err(AnalysisError::NoSeries);
        }
        tracing::debug!("parsed {} series from export", series.len());

        let battery = self.battery_report(&series, request)?;
        Ok(DocumentAnalysis { series, battery })
    }

    fn battery_report(
        &self,
        series: &BTreeMap<String, Series>,
        request: &AnalysisRequest,
    ) -> Result<Option<BatteryReport>, AnalysisError> {
        let Some(voltage) = series.get(BATTERY_VOLTAGE_SERIES) else {
            return Ok(None);
        };

        let full_charge_voltage = request
            .full_charge_voltage
            .unwrap_or(self.defaults.full_charge_voltage);
        let strategy = request.cycle_strategy.unwrap_or(self.defaults.cycle_strategy);

        let daily = aggregate_daily(voltage);
        let discharge = battery_health::discharge_report(&daily, full_charge_voltage)?;
        let cycles = battery_health::cycle_estimate(&discharge, strategy);
        let soh = self.soh_outcome(series, request)?;

        Ok(Some(BatteryReport {
            discharge,
            cycles,
            soh,
        }))
    }

    fn soh_outcome(
        &self,
        series: &BTreeMap<String, Series>,
        request: &AnalysisRequest,
    ) -> Result<SohOutcome, AnalysisError> {
        let Some(current) = series.get(BATTERY_CURRENT_SERIES) else {
            return Ok(SohOutcome::Unavailable {
                reason: format!("{BATTERY_CURRENT_SERIES} data not found in the document"),
            });
        };
        let Some(default) = battery_health::default_window(current) else {
            return Ok(SohOutcome::Unavailable {
                reason: format!("{BATTERY_CURRENT_SERIES} series has no samples"),
            });
        };

        let window = IntegrationWindow {
            start: request.window_start.unwrap_or(default.start),
            end: request.window_end.unwrap_or(default.end),
        };
        let nominal = request
            .nominal_capacity_ah
            .unwrap_or(self.defaults.nominal_capacity_ah);

        match battery_health::state_of_health(current, &window, nominal) {
            Ok(estimate) => Ok(SohOutcome::Estimated(estimate)),
            Err(HealthError::EmptyWindow) => {
                tracing::warn!(
                    "no {} samples between {} and {}",
                    BATTERY_CURRENT_SERIES,
                    window.start,
                    window.end
                );
                Ok(SohOutcome::Unavailable {
                    reason: format!("no {BATTERY_CURRENT_SERIES} data within the selected time range"),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::health::BatteryStatus;
    use serde_json::json;

    fn service() -> AnalysisService {
        AnalysisService::new(AnalysisDefaults::default())
    }

    fn export() -> Vec<u8> {
        serde_json::to_vec(&json!([{
            "Logs": [
                {
                    "Name": "Voltage-Battery",
                    "Values": [
                        { "T": "2024-03-01T00:00:00Z", "V": 99.0 },
                        { "T": "2024-03-01T08:00:00Z", "V": 12.8 },
                        { "T": "2024-03-01T20:00:00Z", "V": 12.6 },
                        { "T": "2024-03-02T08:00:00Z", "V": 12.9 }
                    ]
                },
                {
                    "Name": "Current-Battery",
                    "Values": [
                        { "T": "2024-03-01T00:00:00Z", "V": 99.0 },
                        { "T": "2024-03-01T08:00:00Z", "V": 5.0 },
                        { "T": "2024-03-01T09:00:00Z", "V": 5.0 }
                    ]
                },
                {
                    "Name": "UpTime",
                    "Values": [{ "T": "2024-03-01T08:00:00Z", "V": 3600.0 }]
                }
            ]
        }]))
        .unwrap()
    }

    #[test]
    fn test_full_pipeline() {
        let analysis = service().analyze(&export(), &AnalysisRequest::default()).unwrap();

        // The warm-up sample (99.0) is dropped by the default policy.
        assert_eq!(analysis.series.len(), 3);
        assert_eq!(analysis.series["Voltage-Battery"].len(), 3);

        let battery = analysis.battery.unwrap();
        assert_eq!(battery.discharge.daily.len(), 2);
        assert_eq!(battery.discharge.daily[0].dod_percent, 3.08);
        assert_eq!(battery.discharge.status, BatteryStatus::Excellent);
        assert_eq!(battery.cycles.days_with_data, 2);

        match battery.soh {
            SohOutcome::Estimated(estimate) => {
                // One hour of 5 A against the 33 Ah default capacity.
                assert_eq!(estimate.actual_capacity_ah, 5.0);
                assert!((estimate.soh_percent - 15.15).abs() < 0.01);
            }
            SohOutcome::Unavailable { reason } => panic!("SOH unavailable: {reason}"),
        }
    }

    #[test]
    fn test_battery_section_absent_without_voltage_series() {
        let document = serde_json::to_vec(&json!([{
            "Logs": [{
                "Name": "UpTime",
                "Values": [{ "T": "2024-03-01T08:00:00Z", "V": 60.0 }]
            }]
        }]))
        .unwrap();

        let analysis = service().analyze(&document, &AnalysisRequest::default()).unwrap();
        assert!(analysis.battery.is_none());
        assert_eq!(analysis.series.len(), 1);
    }

    #[test]
    fn test_soh_warning_when_window_misses_all_samples() {
        let request = AnalysisRequest {
            window_start: Some("2025-01-01T00:00:00Z".parse().unwrap()),
            window_end: Some("2025-01-02T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };

        let analysis = service().analyze(&export(), &request).unwrap();
        let battery = analysis.battery.unwrap();
        assert!(matches!(battery.soh, SohOutcome::Unavailable { .. }));
    }

    #[test]
    fn test_invalid_full_charge_voltage_is_rejected() {
        let request = AnalysisRequest {
            full_charge_voltage: Some(-1.0),
            ..Default::default()
        };

        let result = service().analyze(&export(), &request);
        assert!(matches!(
            result,
            Err(AnalysisError::Health(HealthError::InvalidParameter(_)))
        ));
    }

    #[test]
    fn test_all_entries_skipped_is_no_series() {
        let document = serde_json::to_vec(&json!([{
            "Logs": [{ "Name": "", "Values": [] }]
        }]))
        .unwrap();

        let result = service().analyze(&document, &AnalysisRequest::default());
        assert!(matches!(result, Err(AnalysisError::NoSeries)));
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let first = service().analyze(&export(), &AnalysisRequest::default()).unwrap();
        let second = service().analyze(&export(), &AnalysisRequest::default()).unwrap();

        let a = first.battery.unwrap();
        let b = second.battery.unwrap();
        assert_eq!(a.discharge.avg_dod_percent, b.discharge.avg_dod_percent);
        assert_eq!(a.cycles.remaining_cycles, b.cycles.remaining_cycles);
    }
}
