// Comparison service - Use case for quantifying data-reduction error
use thiserror::Error;

use crate::application::analysis_service::BATTERY_VOLTAGE_SERIES;
use crate::application::battery_health;
use crate::application::daily_aggregator::aggregate_daily;
use crate::domain::health::{
    round2, ComparisonReport, CycleStrategy, MetricCompression, RemainingComparison,
};
use crate::domain::series::Series;
use crate::infrastructure::config::{AnalysisDefaults, ComparisonDefaults};
use crate::infrastructure::log_parser::{self, ParseError, ParseOptions};
use std::collections::BTreeMap;

/// Per-request overrides for a comparison.
#[derive(Debug, Clone, Default)]
pub struct ComparisonRequest {
    pub metrics: Option<Vec<String>>,
    pub reference_voltage: Option<f64>,
    pub cycle_strategy: Option<CycleStrategy>,
    pub drop_first_sample: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{side} document contains no {name} series")]
    MissingSeries {
        side: &'static str,
        name: &'static str,
    },
    #[error(transparent)]
    Health(#[from] battery_health::HealthError),
}

/// Runs the same parse -> aggregate -> cycle-estimate pipeline over a full
/// export and a sampled export of the same device, and reports the sample
/// counts and remaining-cycle discrepancy the sampling introduced.
#[derive(Clone)]
pub struct ComparisonService {
    defaults: ComparisonDefaults,
    analysis: AnalysisDefaults,
}

impl ComparisonService {
    pub fn new(defaults: ComparisonDefaults, analysis: AnalysisDefaults) -> Self {
        Self { defaults, analysis }
    }

    pub fn compare(
        &self,
        full_document: &serde_json::Value,
        sample_document: &serde_json::Value,
        request: &ComparisonRequest,
    ) -> Result<ComparisonReport, ComparisonError> {
        let options = ParseOptions {
            drop_first_sample: request
                .drop_first_sample
                .unwrap_or(self.analysis.drop_first_sample),
        };

        let full = log_parser::parse_value(full_document, options)?;
        let sample = log_parser::parse_value(sample_document, options)?;

        let metric_keys = request
            .metrics
            .clone()
            .unwrap_or_else(|| self.defaults.metrics.clone());

        let mut metrics = BTreeMap::new();
        for key in metric_keys {
            let full_count = full.get(&key).map(Series::len).unwrap_or(0);
            let sample_count = sample.get(&key).map(Series::len).unwrap_or(0);
            metrics.insert(
                key,
                MetricCompression {
                    full_count,
                    sample_count,
                    compression_percent: compression_percent(full_count, sample_count),
                },
            );
        }

        let reference_voltage = request
            .reference_voltage
            .unwrap_or(self.defaults.reference_voltage);
        let strategy = request.cycle_strategy.unwrap_or(self.defaults.cycle_strategy);

        let full_remaining = remaining_cycles(&full, "full", reference_voltage, strategy)?;
        let sample_remaining = remaining_cycles(&sample, "sample", reference_voltage, strategy)?;

        Ok(ComparisonReport {
            metrics,
            remaining: RemainingComparison {
                strategy,
                reference_voltage,
                full_remaining_cycles: full_remaining,
                sample_remaining_cycles: sample_remaining,
                absolute_error: (full_remaining - sample_remaining).abs(),
            },
        })
    }
}

/// Sample-count reduction as a percentage. An absent full series counts as a
/// 100 % reduction rather than a division error.
fn compression_percent(full_count: usize, sample_count: usize) -> f64 {
    if full_count == 0 {
        return 100.0;
    }
    100.0 - round2(sample_count as f64 / full_count as f64 * 100.0)
}

fn remaining_cycles(
    series: &BTreeMap<String, Series>,
    side: &'static str,
    reference_voltage: f64,
    strategy: CycleStrategy,
) -> Result<f64, ComparisonError> {
    let Some(voltage) = series.get(BATTERY_VOLTAGE_SERIES) else {
        return Err(ComparisonError::MissingSeries {
            side,
            name: BATTERY_VOLTAGE_SERIES,
        });
    };

    let daily = aggregate_daily(voltage);
    let discharge = battery_health::discharge_report(&daily, reference_voltage)?;
    Ok(battery_health::cycle_estimate(&discharge, strategy).remaining_cycles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> ComparisonService {
        ComparisonService::new(ComparisonDefaults::default(), AnalysisDefaults::default())
    }

    fn voltage_export(timestamps_and_values: &[(&str, f64)]) -> serde_json::Value {
        let values: Vec<serde_json::Value> = timestamps_and_values
            .iter()
            .map(|(t, v)| json!({ "T": t, "V": v }))
            .collect();
        json!([{ "Logs": [{ "Name": "Voltage-Battery", "Values": values }] }])
    }

    #[test]
    fn test_compression_percent() {
        assert_eq!(compression_percent(1000, 100), 90.0);
        assert_eq!(compression_percent(0, 0), 100.0);
        assert_eq!(compression_percent(3, 3), 0.0);
    }

    #[test]
    fn test_compare_counts_and_discrepancy() {
        let full = voltage_export(&[
            ("2024-03-01T06:00:00Z", 12.9),
            ("2024-03-01T12:00:00Z", 12.6),
            ("2024-03-01T18:00:00Z", 12.7),
            ("2024-03-02T06:00:00Z", 12.8),
            ("2024-03-02T12:00:00Z", 12.5),
        ]);
        let sample = voltage_export(&[
            ("2024-03-01T06:00:00Z", 12.9),
            ("2024-03-01T12:00:00Z", 12.6),
            ("2024-03-02T06:00:00Z", 12.8),
        ]);

        let request = ComparisonRequest {
            drop_first_sample: Some(false),
            ..Default::default()
        };
        let report = service().compare(&full, &sample, &request).unwrap();

        let voltage = &report.metrics["Voltage-Battery"];
        assert_eq!(voltage.full_count, 5);
        assert_eq!(voltage.sample_count, 3);
        assert_eq!(voltage.compression_percent, 40.0);

        // Current-Battery exists in neither document.
        let current = &report.metrics["Current-Battery"];
        assert_eq!(current.compression_percent, 100.0);

        // The sampled export misses the deepest day-2 discharge (12.5 V), so
        // its remaining-cycle estimate diverges from the full one.
        assert_eq!(report.remaining.strategy, CycleStrategy::Quadratic);
        assert_eq!(report.remaining.reference_voltage, 13.0);
        assert!(report.remaining.absolute_error > 0.0);
        assert_eq!(
            report.remaining.absolute_error,
            (report.remaining.full_remaining_cycles - report.remaining.sample_remaining_cycles)
                .abs()
        );
    }

    #[test]
    fn test_identical_documents_have_zero_error() {
        let document = voltage_export(&[
            ("2024-03-01T06:00:00Z", 12.9),
            ("2024-03-01T12:00:00Z", 12.6),
        ]);

        let report = service()
            .compare(&document, &document, &ComparisonRequest::default())
            .unwrap();
        assert_eq!(report.remaining.absolute_error, 0.0);
        assert_eq!(report.metrics["Voltage-Battery"].compression_percent, 0.0);
    }

    #[test]
    fn test_missing_voltage_series_fails_the_comparison() {
        let full = voltage_export(&[("2024-03-01T06:00:00Z", 12.9)]);
        let sample = json!([{ "Logs": [{ "Name": "UpTime", "Values": [{ "T": "2024-03-01T06:00:00Z", "V": 1.0 }] }] }]);

        let result = service().compare(&full, &sample, &ComparisonRequest::default());
        assert!(matches!(
            result,
            Err(ComparisonError::MissingSeries { side: "sample", .. })
        ));
    }

    #[test]
    fn test_custom_metric_keys() {
        let document = json!([{ "Logs": [
            { "Name": "Voltage-Battery", "Values": [{ "T": "2024-03-01T06:00:00Z", "V": 12.9 }] },
            { "Name": "Voltage-Solar", "Values": [
                { "T": "2024-03-01T06:00:00Z", "V": 18.2 },
                { "T": "2024-03-01T07:00:00Z", "V": 18.4 }
            ] }
        ] }]);

        let request = ComparisonRequest {
            metrics: Some(vec!["Voltage-Solar".to_string()]),
            drop_first_sample: Some(false),
            ..Default::default()
        };
        let report = service().compare(&document, &document, &request).unwrap();

        assert_eq!(report.metrics.len(), 1);
        assert_eq!(report.metrics["Voltage-Solar"].full_count, 2);
    }
}
