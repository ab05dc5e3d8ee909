//! Published quantities and measurement cycles

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Quantities published by a sensor station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// Air temperature (°C)
    Temperature,
    /// Relative humidity (%)
    Humidity,
    /// Barometric pressure (hPa)
    Pressure,
    /// Visible light (lux)
    LightIntensity,
    /// Estimated CO2 concentration (ppm)
    Co2,
}

impl Quantity {
    /// Every quantity, in publishing order
    pub const ALL: [Quantity; 5] = [
        Quantity::Temperature,
        Quantity::Humidity,
        Quantity::Pressure,
        Quantity::LightIntensity,
        Quantity::Co2,
    ];

    /// Stable name used in topics and logs
    pub const fn name(self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Humidity => "humidity",
            Quantity::Pressure => "pressure",
            Quantity::LightIntensity => "light_intensity",
            Quantity::Co2 => "co2",
        }
    }

    /// Unit symbol
    pub const fn unit(self) -> &'static str {
        match self {
            Quantity::Temperature => "°C",
            Quantity::Humidity => "%",
            Quantity::Pressure => "hPa",
            Quantity::LightIntensity => "lux",
            Quantity::Co2 => "ppm",
        }
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// One quantity within a measurement cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantityReading {
    /// What was measured
    pub quantity: Quantity,
    /// Value read from the reader (or estimator) before station filtering
    pub raw: f64,
    /// Output of the quantity's filter
    pub filtered: f64,
    /// Filtered value rounded to two decimals, as sent to the sink
    pub published: f64,
}

impl QuantityReading {
    /// Build a reading, rounding the filtered value for publishing
    pub fn new(quantity: Quantity, raw: f64, filtered: f64) -> Self {
        Self { quantity, raw, filtered, published: round_to_hundredths(filtered) }
    }
}

/// Everything produced by one measurement tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// When the cycle ran
    pub timestamp: Timestamp,
    /// Readings in publishing order; a quantity is missing when it was skipped
    pub readings: Vec<QuantityReading>,
}

impl Measurement {
    /// Reading for `quantity`, if it was measured this cycle
    pub fn get(&self, quantity: Quantity) -> Option<&QuantityReading> {
        self.readings.iter().find(|r| r.quantity == quantity)
    }

    /// Published value for `quantity`
    pub fn value(&self, quantity: Quantity) -> Option<f64> {
        self.get(quantity).map(|r| r.published)
    }

    /// `(quantity, published value)` pairs in publishing order
    pub fn published(&self) -> impl Iterator<Item = (Quantity, f64)> + '_ {
        self.readings.iter().map(|r| (r.quantity, r.published))
    }
}

/// `floor(value * 100 + 0.5) / 100`
///
/// Halves round up towards positive infinity, for negative values too:
/// `-0.125` becomes `-0.12`.
pub fn round_to_hundredths(value: f64) -> f64 {
    libm::floor(value * 100.0 + 0.5) / 100.0
}
