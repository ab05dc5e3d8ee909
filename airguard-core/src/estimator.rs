//! Gas Concentration Estimation
//!
//! ## Overview
//!
//! The MQ-135 is a heated metal oxide sensor whose resistance drops as the
//! concentration of CO2 (and other gases) rises. The board forms a voltage
//! divider with a fixed load resistance, read through the ADC:
//!
//! ```text
//! R   = ((32767 * 4.096 / adc) - 1) * R_LOAD
//! ppm = PARA * (R / R_ZERO) ^ (-PARB)
//! ```
//!
//! The published concentration then passes through the estimator's own
//! low-pass stage and is rounded to whole ppm. The station runs the result
//! through a second, per-quantity filter before publishing.
//!
//! Temperature and humidity shift the curve. The correction factor
//! `CORA*T² - CORB*T + CORC - (H - 33)*CORD` is available through the
//! `corrected_*` accessors for diagnostics; the published value is the
//! uncorrected one.
//!
//! ## Precondition
//!
//! The ADC count must be strictly positive. A zero count divides by zero and
//! a negative count yields a meaningless resistance; callers guard against
//! both (the station skips the gas quantity for that cycle). The estimator
//! does not check.

use crate::config::GasConfig;
use crate::constants::gas::{
    ATMOSPHERIC_CO2_PPM, CORA, CORB, CORC, CORD, CORRECTION_HUMIDITY_PCT, DEFAULT_HUMIDITY_PCT,
    DEFAULT_TEMPERATURE_C, PARA, PARB,
};
use crate::constants::sensors::{ADC_FULL_SCALE_COUNT, ADC_REFERENCE_VOLTAGE};
use crate::errors::FilterResult;
use crate::filter::SignalFilter;

/// CO2 estimator for an MQ-135 behind the four-channel ADC
#[derive(Debug, Clone)]
pub struct GasEstimator {
    adc_value: f64,
    temperature: f64,
    humidity: f64,
    r_zero: f64,
    load_resistance: f64,
    filter: SignalFilter,
}

impl GasEstimator {
    /// Estimator with calibration and filter settings from `config`
    pub fn from_config(config: &GasConfig) -> FilterResult<Self> {
        Ok(Self {
            adc_value: 0.0,
            temperature: DEFAULT_TEMPERATURE_C,
            humidity: DEFAULT_HUMIDITY_PCT,
            r_zero: config.r_zero,
            load_resistance: config.load_resistance,
            filter: config.filter().build()?,
        })
    }

    /// Set the raw ADC count for the next calculation; must be positive
    pub fn set_adc_value(&mut self, adc_value: i32) {
        self.adc_value = f64::from(adc_value);
    }

    /// Set the ambient temperature (°C)
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    /// Set the relative humidity (%)
    pub fn set_humidity(&mut self, humidity: f64) {
        self.humidity = humidity;
    }

    /// Current raw ADC count
    pub fn adc_value(&self) -> f64 {
        self.adc_value
    }

    /// Current temperature input (°C)
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Current humidity input (%)
    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    /// Feed the filter and return the concentration rounded to whole ppm
    pub fn calculate_ppm(&mut self) -> f64 {
        let ppm = self.ppm_for(self.resistance());
        libm::round(self.filter.filter_value(ppm))
    }

    /// Sensor resistance (kΩ)
    pub fn resistance(&self) -> f64 {
        ((ADC_FULL_SCALE_COUNT * ADC_REFERENCE_VOLTAGE / self.adc_value) - 1.0) * self.load_resistance
    }

    /// Temperature and humidity dependency of the sensor
    pub fn correction_factor(&self) -> f64 {
        let t = self.temperature;
        CORA * t * t - CORB * t + CORC - (self.humidity - CORRECTION_HUMIDITY_PCT) * CORD
    }

    /// Resistance compensated for temperature and humidity (kΩ)
    pub fn corrected_resistance(&self) -> f64 {
        self.resistance() / self.correction_factor()
    }

    /// Unfiltered concentration from the compensated resistance (ppm)
    pub fn corrected_ppm(&self) -> f64 {
        self.ppm_for(self.corrected_resistance())
    }

    /// R_ZERO that would make the current reading equal the atmospheric CO2
    /// level; measure in fresh air to calibrate (kΩ)
    pub fn calibration_resistance(&self) -> f64 {
        self.resistance() * atmospheric_ratio()
    }

    /// Same as [`GasEstimator::calibration_resistance`] with compensation
    pub fn corrected_calibration_resistance(&self) -> f64 {
        self.corrected_resistance() * atmospheric_ratio()
    }

    /// The estimator's own low-pass stage
    pub fn filter(&self) -> &SignalFilter {
        &self.filter
    }

    fn ppm_for(&self, resistance: f64) -> f64 {
        PARA * libm::pow(resistance / self.r_zero, -PARB)
    }
}

fn atmospheric_ratio() -> f64 {
    libm::pow(ATMOSPHERIC_CO2_PPM / PARA, 1.0 / PARB)
}
