//! Default Filter Parameters
//!
//! Per-quantity settings of the deployed station. Temperature, humidity and
//! light already arrive smoothed from their readers, so the station only
//! averages a few measurement ticks on top.

/// A filter reports ready once `1 / READINESS_DIVISOR` of its window is filled.
pub const READINESS_DIVISOR: usize = 10;

/// Low-pass alpha used when none is configured.
pub const DEFAULT_LOW_PASS_ALPHA: f64 = 0.2;

/// High-pass alpha used when none is configured.
pub const DEFAULT_HIGH_PASS_ALPHA: f64 = 0.5;

/// Station temperature moving average window (ticks).
pub const TEMPERATURE_WINDOW: usize = 3;

/// Station humidity moving average window (ticks).
pub const HUMIDITY_WINDOW: usize = 3;

/// Station pressure low-pass window (ticks).
pub const PRESSURE_WINDOW: usize = 5;

/// Station light moving average window (ticks).
pub const LIGHT_WINDOW: usize = 3;

/// Station CO2 moving average window (ticks).
pub const CO2_WINDOW: usize = 5;

/// In-reader smoothing window for climate and light samples.
pub const READER_SMOOTHING_WINDOW: usize = 10;

/// In-reader smoothing alpha for climate and light samples.
pub const READER_SMOOTHING_ALPHA: f64 = 0.3;
