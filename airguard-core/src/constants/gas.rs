//! MQ-135 Calibration Parameters
//!
//! The sensor's resistance falls as the concentration of CO2 (and other
//! gases) rises. Concentration follows a power law of the resistance ratio
//! against a reference resistance `R_ZERO` measured in clean air:
//!
//! ```text
//! ppm = PARA * (R / R_ZERO) ^ (-PARB)
//! ```
//!
//! Temperature and humidity bend the curve; the correction factor is a
//! quadratic fit in temperature with a linear humidity term around 33 %RH.
//! Parameters follow the public MQ135 Arduino calibration.

/// Load resistance on the board (kΩ).
pub const LOAD_RESISTANCE: f64 = 10.0;

/// Calibration resistance at atmospheric CO2 level (kΩ).
pub const R_ZERO: f64 = 350.0;

/// Power law scale for ppm from resistance ratio.
pub const PARA: f64 = 116.602_068_2;

/// Power law exponent for ppm from resistance ratio.
pub const PARB: f64 = 2.769_034_857;

/// Quadratic temperature coefficient of the correction factor.
pub const CORA: f64 = 0.000_35;

/// Linear temperature coefficient of the correction factor.
pub const CORB: f64 = 0.027_18;

/// Constant term of the correction factor.
pub const CORC: f64 = 1.395_38;

/// Humidity coefficient of the correction factor.
pub const CORD: f64 = 0.0018;

/// Humidity around which the correction is centered (%RH).
pub const CORRECTION_HUMIDITY_PCT: f64 = 33.0;

/// Atmospheric CO2 level used for calibration (ppm).
pub const ATMOSPHERIC_CO2_PPM: f64 = 397.13;

/// Temperature assumed before the first climate reading (°C).
pub const DEFAULT_TEMPERATURE_C: f64 = 22.0;

/// Humidity assumed before the first climate reading (%RH).
pub const DEFAULT_HUMIDITY_PCT: f64 = 50.0;

/// Window of the estimator's own low-pass stage.
pub const ESTIMATOR_WINDOW: usize = 5;

/// Smoothing factor of the estimator's own low-pass stage.
pub const ESTIMATOR_ALPHA: f64 = 0.4;
