//! Constants for AirGuard Core
//!
//! Centralized numeric values used across the sampling pipeline. Every
//! constant carries its unit in the name or the doc comment.
//!
//! ## Organization
//!
//! - **Sensors**: bus addresses and converter full-scale values
//! - **Gas**: MQ-135 calibration parameters
//! - **Filters**: default window sizes and smoothing factors
//! - **Time**: sampling and measurement cadence

/// Bus addresses and converter characteristics.
pub mod sensors;

/// MQ-135 gas sensor calibration parameters.
pub mod gas;

/// Default filter parameters for each published quantity.
pub mod filters;

/// Sampling intervals and measurement periods.
pub mod time;

pub use sensors::{
    ADC_ADDRESS, CLIMATE_ADDRESS, LIGHT_ADDRESS, PRESSURE_ADDRESS,
    ADC_FULL_SCALE_COUNT, ADC_REFERENCE_VOLTAGE,
};

pub use time::{
    DEFAULT_SAMPLE_INTERVAL_MS, DEFAULT_BACKOFF_INTERVAL_MS, DEFAULT_MEASURE_PERIOD_SECS,
};
