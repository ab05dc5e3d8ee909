//! Sample Types for the Station's Transducers
//!
//! ## Overview
//!
//! The station samples four devices. Their bus protocols live with the
//! transducer implementations; this module only defines what each one
//! publishes and how raw register words turn into physical units.
//!
//! | Device  | Address | Sample             | Channels                     |
//! |---------|---------|--------------------|------------------------------|
//! | ADS1115 | 0x48    | [`AdcSample`]      | four signed counts           |
//! | SHT30   | 0x44    | [`ClimateSample`]  | temperature °C, humidity %RH |
//! | BMP180  | 0x77    | [`PressureSample`] | pressure hPa, altitude m     |
//! | TSL2561 | 0x39    | [`LightSample`]    | visible light lux            |
//!
//! Each sample type also gets typed accessors on
//! [`crate::reader::ContinuousReader`], e.g. `current_temperature()` on a
//! reader whose transducer produces [`ClimateSample`].
//!
//! ## In-reader Smoothing
//!
//! Climate and light readings are noisy at the 500 ms sampling rate. Wrapping
//! their transducers in [`Smoothed`] runs a low-pass filter per channel inside
//! the sampling loop, so the cached value is already smoothed when the
//! station reads it.

mod adc;
mod climate;
mod light;
mod pressure;
mod smoothed;

pub use adc::{AdcChannel, AdcSample};
pub use climate::ClimateSample;
pub use light::LightSample;
pub use pressure::PressureSample;
pub use smoothed::Smoothed;
