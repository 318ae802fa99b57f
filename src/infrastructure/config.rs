use serde::Deserialize;

use crate::domain::health::CycleStrategy;

#[derive(Debug, Deserialize, Clone)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub analysis: AnalysisDefaults,
    #[serde(default)]
    pub comparison: ComparisonDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Fallbacks for analysis parameters a request does not override. These are
/// presentation-level conveniences; the computation itself never assumes
/// them.
#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisDefaults {
    #[serde(default = "default_full_charge_voltage")]
    pub full_charge_voltage: f64,
    #[serde(default = "default_nominal_capacity_ah")]
    pub nominal_capacity_ah: f64,
    #[serde(default = "default_drop_first_sample")]
    pub drop_first_sample: bool,
    #[serde(default = "default_cycle_strategy")]
    pub cycle_strategy: CycleStrategy,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            full_charge_voltage: default_full_charge_voltage(),
            nominal_capacity_ah: default_nominal_capacity_ah(),
            drop_first_sample: default_drop_first_sample(),
            cycle_strategy: default_cycle_strategy(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ComparisonDefaults {
    #[serde(default = "default_full_charge_voltage")]
    pub reference_voltage: f64,
    #[serde(default = "default_cycle_strategy")]
    pub cycle_strategy: CycleStrategy,
    #[serde(default = "default_metric_keys")]
    pub metrics: Vec<String>,
}

impl Default for ComparisonDefaults {
    fn default() -> Self {
        Self {
            reference_voltage: default_full_charge_voltage(),
            cycle_strategy: default_cycle_strategy(),
            metrics: default_metric_keys(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_full_charge_voltage() -> f64 {
    13.0
}

fn default_nominal_capacity_ah() -> f64 {
    33.0
}

fn default_drop_first_sample() -> bool {
    true
}

fn default_cycle_strategy() -> CycleStrategy {
    CycleStrategy::Quadratic
}

fn default_metric_keys() -> Vec<String> {
    vec!["Voltage-Battery".to_string(), "Current-Battery".to_string()]
}

/// Load configuration from an optional `config/analyzer` file over the
/// built-in defaults.
pub fn load_analyzer_config() -> anyhow::Result<AnalyzerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/analyzer").required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}
