// JSON log-export parsing into typed series
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::series::{SamplePoint, Series};

#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not valid JSON at all.
    #[error("invalid JSON document: {0}")]
    Format(#[from] serde_json::Error),
    /// Valid JSON, but not the `[{"Logs": [...]}]` export shape. Surfaced to
    /// callers as "no data available".
    #[error("unexpected document structure: {0}")]
    Structure(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Drop the first sample of every entry holding more than one sample.
    /// Some firmware revisions emit a warm-up reading at power-on, so this
    /// stays a caller decision rather than an implicit behavior.
    pub drop_first_sample: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            drop_first_sample: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Values", default)]
    values: Vec<RawSample>,
}

#[derive(Debug, Deserialize)]
struct RawSample {
    #[serde(rename = "T", default)]
    t: Option<String>,
    #[serde(rename = "V", default)]
    v: Option<serde_json::Value>,
}

/// Parse a raw log export into a mapping of named series.
///
/// Entries with a missing/empty `Name` or `Values` are skipped, as are
/// individual samples that cannot be decoded; an entry left with no valid
/// samples is omitted entirely, so empty series never appear in the result.
/// An empty map is a valid outcome and means "no valid series found".
pub fn parse(
    document: &[u8],
    options: ParseOptions,
) -> Result<BTreeMap<String, Series>, ParseError> {
    let root: serde_json::Value = serde_json::from_slice(document)?;
    parse_value(&root, options)
}

/// Same as [`parse`], for a document that has already been decoded to JSON.
pub fn parse_value(
    root: &serde_json::Value,
    options: ParseOptions,
) -> Result<BTreeMap<String, Series>, ParseError> {
    let entries = extract_entries(root)?;

    let mut series_map = BTreeMap::new();
    for raw_entry in entries {
        let entry = match serde_json::from_value::<RawEntry>(raw_entry.clone()) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping malformed log entry: {}", e);
                continue;
            }
        };

        let Some(name) = entry.name.filter(|n| !n.is_empty()) else {
            continue;
        };
        if entry.values.is_empty() {
            continue;
        }

        let samples = if options.drop_first_sample && entry.values.len() > 1 {
            &entry.values[1..]
        } else {
            &entry.values[..]
        };

        let mut points = Vec::with_capacity(samples.len());
        for sample in samples {
            let (Some(t), Some(v)) = (&sample.t, &sample.v) else {
                tracing::warn!("skipping sample without T/V in entry {}", name);
                continue;
            };
            let Some(value) = v.as_f64() else {
                tracing::warn!("skipping non-numeric sample value in entry {}", name);
                continue;
            };
            match parse_timestamp(t) {
                Some(timestamp) => points.push(SamplePoint::new(timestamp, value)),
                None => {
                    tracing::warn!("skipping unparseable timestamp {:?} in entry {}", t, name);
                }
            }
        }

        if points.is_empty() {
            tracing::warn!("entry {} has no valid samples, omitting", name);
            continue;
        }

        series_map.insert(name.clone(), Series::new(name, points));
    }

    Ok(series_map)
}

fn extract_entries(root: &serde_json::Value) -> Result<&Vec<serde_json::Value>, ParseError> {
    let first = root
        .as_array()
        .and_then(|documents| documents.first())
        .ok_or(ParseError::Structure("top-level value is not a non-empty array"))?;

    first
        .get("Logs")
        .and_then(|logs| logs.as_array())
        .ok_or(ParseError::Structure("first element carries no Logs array"))
}

/// Timestamps are normalized to UTC here; naive inputs are taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    None
}
