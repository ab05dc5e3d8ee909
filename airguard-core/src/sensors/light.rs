//! TSL2561 light samples

use serde::{Deserialize, Serialize};

use crate::reader::ContinuousReader;
use crate::traits::{Channels, Transducer};

/// Visible light intensity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LightSample {
    /// Visible light (lux)
    pub lux: f64,
}

impl LightSample {
    /// Visible light from the broadband and infrared photodiode channels
    pub fn from_channels(full_spectrum: u16, infrared: u16) -> Self {
        Self { lux: f64::from(full_spectrum.saturating_sub(infrared)) }
    }
}

impl Channels for LightSample {
    const COUNT: usize = 1;

    fn channel(&self, index: usize) -> f64 {
        if index == 0 { self.lux } else { 0.0 }
    }

    fn set_channel(&mut self, index: usize, value: f64) {
        if index == 0 {
            self.lux = value;
        }
    }
}

impl<T: Transducer<Sample = LightSample>> ContinuousReader<T> {
    /// Latest visible light (lux), 0 before the first sample
    pub fn current_lux(&self) -> f64 {
        self.current().lux
    }
}
