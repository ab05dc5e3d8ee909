//! SHT30 temperature and humidity samples

use serde::{Deserialize, Serialize};

use crate::constants::sensors::{
    CLIMATE_RAW_FULL_SCALE, CLIMATE_TEMPERATURE_OFFSET_C, CLIMATE_TEMPERATURE_SPAN_C,
};
use crate::reader::ContinuousReader;
use crate::traits::{Channels, Transducer};

/// Temperature and relative humidity measured in the same conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateSample {
    /// Air temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
}

impl ClimateSample {
    /// Decode the two 16-bit measurement words
    ///
    /// `T = -45 + 175 * raw / 65535`, `RH = 100 * raw / 65535`
    pub fn from_raw(raw_temperature: u16, raw_humidity: u16) -> Self {
        Self {
            temperature: CLIMATE_TEMPERATURE_OFFSET_C
                + CLIMATE_TEMPERATURE_SPAN_C * f64::from(raw_temperature) / CLIMATE_RAW_FULL_SCALE,
            humidity: 100.0 * f64::from(raw_humidity) / CLIMATE_RAW_FULL_SCALE,
        }
    }
}

impl Channels for ClimateSample {
    const COUNT: usize = 2;

    fn channel(&self, index: usize) -> f64 {
        match index {
            0 => self.temperature,
            1 => self.humidity,
            _ => 0.0,
        }
    }

    fn set_channel(&mut self, index: usize, value: f64) {
        match index {
            0 => self.temperature = value,
            1 => self.humidity = value,
            _ => {}
        }
    }
}

impl<T: Transducer<Sample = ClimateSample>> ContinuousReader<T> {
    /// Latest temperature (°C), 0 before the first sample
    pub fn current_temperature(&self) -> f64 {
        self.current().temperature
    }

    /// Latest relative humidity (%), 0 before the first sample
    pub fn current_humidity(&self) -> f64 {
        self.current().humidity
    }
}
