// Response views - Map domain results to JSON payloads
use serde::Serialize;

use crate::application::analysis_service::DocumentAnalysis;
use crate::domain::health::BatteryReport;
use crate::domain::series::Series;

/// Chart colors for the metric names the device is known to export. Unknown
/// series carry no hint and are left to the presentation layer.
fn series_color(name: &str) -> Option<&'static str> {
    match name {
        "Voltage-Battery" => Some("red"),
        "Voltage-Solar" => Some("blue"),
        "Current-Battery" => Some("green"),
        "Current-Solar" => Some("orange"),
        "UpTime" => Some("purple"),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
pub struct PointView {
    pub time_ms: i64,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct SeriesView {
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<PointView>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisView {
    pub series: Vec<SeriesView>,
    pub battery: Option<BatteryReport>,
}

pub fn analysis_view(analysis: DocumentAnalysis) -> AnalysisView {
    let series = analysis
        .series
        .into_values()
        .map(series_view)
        .collect();

    AnalysisView {
        series,
        battery: analysis.battery,
    }
}

fn series_view(series: Series) -> SeriesView {
    // Charts want chronological order even when the logger wrote out of
    // order.
    let points = series
        .sorted_points()
        .into_iter()
        .map(|p| PointView {
            time_ms: p.timestamp.timestamp_millis(),
            value: p.value,
        })
        .collect();

    SeriesView {
        name: series.name.clone(),
        color: series_color(&series.name).map(str::to_string),
        points,
    }
}
