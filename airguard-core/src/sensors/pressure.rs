//! BMP180 pressure samples

use serde::{Deserialize, Serialize};

use crate::constants::sensors::{
    ALTITUDE_EXPONENT, ALTITUDE_SCALE_M, PA_TO_HPA, SEA_LEVEL_PRESSURE_PA,
};
use crate::reader::ContinuousReader;
use crate::traits::{Channels, Transducer};

/// Compensated pressure and the altitude it implies
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PressureSample {
    /// Barometric pressure (hPa)
    pub pressure: f64,
    /// Altitude above standard sea level (m)
    pub altitude: f64,
}

impl PressureSample {
    /// Sample from a compensated pressure in pascal
    pub fn from_pascal(pressure_pa: i64) -> Self {
        let pa = pressure_pa as f64;
        Self { pressure: pa * PA_TO_HPA, altitude: altitude_from_pascal(pa) }
    }
}

/// Barometric formula: `44330 * (1 - (p / 101325) ^ (1 / 5.255))`
pub fn altitude_from_pascal(pressure_pa: f64) -> f64 {
    ALTITUDE_SCALE_M * (1.0 - libm::pow(pressure_pa / SEA_LEVEL_PRESSURE_PA, 1.0 / ALTITUDE_EXPONENT))
}

impl Channels for PressureSample {
    const COUNT: usize = 2;

    fn channel(&self, index: usize) -> f64 {
        match index {
            0 => self.pressure,
            1 => self.altitude,
            _ => 0.0,
        }
    }

    fn set_channel(&mut self, index: usize, value: f64) {
        match index {
            0 => self.pressure = value,
            1 => self.altitude = value,
            _ => {}
        }
    }
}

impl<T: Transducer<Sample = PressureSample>> ContinuousReader<T> {
    /// Latest pressure (hPa), 0 before the first sample
    pub fn current_pressure(&self) -> f64 {
        self.current().pressure
    }

    /// Latest altitude estimate (m)
    pub fn current_altitude(&self) -> f64 {
        self.current().altitude
    }
}
