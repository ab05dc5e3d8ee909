//! Station configuration
//!
//! Every field has a default matching the deployed monitor, so an empty JSON
//! object is a complete configuration:
//!
//! ```rust
//! use airguard_core::config::StationConfig;
//!
//! let config = StationConfig::from_json(r#"{ "measure_period_secs": 600 }"#).unwrap();
//! assert_eq!(config.group, "sensor-station");
//! assert_eq!(config.measure_period().as_secs(), 600);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::filters::{
    CO2_WINDOW, DEFAULT_LOW_PASS_ALPHA, HUMIDITY_WINDOW, LIGHT_WINDOW, PRESSURE_WINDOW,
    TEMPERATURE_WINDOW,
};
use crate::constants::gas::{ESTIMATOR_ALPHA, ESTIMATOR_WINDOW, LOAD_RESISTANCE, R_ZERO};
use crate::constants::time::DEFAULT_MEASURE_PERIOD_SECS;
use crate::errors::ConfigError;
use crate::filter::FilterConfig;
use crate::measurement::Quantity;
use crate::sensors::AdcChannel;

/// Group name used when none is configured
pub const DEFAULT_GROUP: &str = "sensor-station";

/// Complete station settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Logical sensor group; one active station per group
    pub group: String,
    /// Seconds between two measurement ticks
    pub measure_period_secs: u64,
    /// Station filter per published quantity
    pub filters: QuantityFilters,
    /// Gas estimator settings
    pub gas: GasConfig,
    /// Append one line per tick to this file when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_log: Option<PathBuf>,
    /// Low-pass climate and light samples inside their readers, light
    /// rounded to whole lux
    pub reader_smoothing: bool,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP.to_string(),
            measure_period_secs: DEFAULT_MEASURE_PERIOD_SECS,
            filters: QuantityFilters::default(),
            gas: GasConfig::default(),
            debug_log: None,
            reader_smoothing: true,
        }
    }
}

impl StationConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Check every setting without building anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group.is_empty() {
            return Err(ConfigError::Invalid { field: "group" });
        }
        if self.measure_period_secs == 0 {
            return Err(ConfigError::Invalid { field: "measure_period_secs" });
        }
        for quantity in Quantity::ALL {
            self.filters.get(quantity).build()?;
        }
        self.gas.validate()
    }

    /// Tick period
    pub fn measure_period(&self) -> Duration {
        Duration::from_secs(self.measure_period_secs)
    }
}

/// One filter per published quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantityFilters {
    /// Temperature filter
    pub temperature: FilterConfig,
    /// Humidity filter
    pub humidity: FilterConfig,
    /// Pressure filter
    pub pressure: FilterConfig,
    /// Light intensity filter
    pub light: FilterConfig,
    /// Second-stage CO2 filter, applied after the estimator's own low-pass
    pub co2: FilterConfig,
}

impl Default for QuantityFilters {
    fn default() -> Self {
        Self {
            temperature: FilterConfig::moving_average(TEMPERATURE_WINDOW),
            humidity: FilterConfig::moving_average(HUMIDITY_WINDOW),
            pressure: FilterConfig::low_pass(PRESSURE_WINDOW, DEFAULT_LOW_PASS_ALPHA),
            light: FilterConfig::moving_average(LIGHT_WINDOW),
            co2: FilterConfig::moving_average(CO2_WINDOW),
        }
    }
}

impl QuantityFilters {
    /// Filter settings for `quantity`
    pub fn get(&self, quantity: Quantity) -> &FilterConfig {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Humidity => &self.humidity,
            Quantity::Pressure => &self.pressure,
            Quantity::LightIntensity => &self.light,
            Quantity::Co2 => &self.co2,
        }
    }
}

/// Gas estimator settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    /// Converter input wired to the gas sensor
    pub adc_channel: AdcChannel,
    /// Window of the estimator's low-pass stage
    pub window_size: usize,
    /// Alpha of the estimator's low-pass stage
    pub low_pass_alpha: f64,
    /// Calibration resistance in clean air (kΩ)
    pub r_zero: f64,
    /// Board load resistance (kΩ)
    pub load_resistance: f64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            adc_channel: AdcChannel::Channel1,
            window_size: ESTIMATOR_WINDOW,
            low_pass_alpha: ESTIMATOR_ALPHA,
            r_zero: R_ZERO,
            load_resistance: LOAD_RESISTANCE,
        }
    }
}

impl GasConfig {
    /// Settings of the estimator's own filter
    pub fn filter(&self) -> FilterConfig {
        FilterConfig::low_pass(self.window_size, self.low_pass_alpha)
    }

    /// Check filter and calibration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter().build()?;
        if !is_positive(self.r_zero) {
            return Err(ConfigError::Invalid { field: "gas.r_zero" });
        }
        if !is_positive(self.load_resistance) {
            return Err(ConfigError::Invalid { field: "gas.load_resistance" });
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
