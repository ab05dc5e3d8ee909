//! Sensor Bus Addresses and Converter Characteristics
//!
//! Addresses are the factory defaults of the boards used by the station, as
//! reported by `i2cdetect -y 1`:
//!
//! ```text
//!      0  1  2  3  4  5  6  7  8  9  a  b  c  d  e  f
//! 30: -- -- -- -- -- -- -- -- -- 39 -- -- -- -- -- --
//! 40: -- -- -- -- 44 -- -- -- 48 -- -- -- -- -- -- --
//! 70: -- -- -- -- -- -- -- 77
//! ```

// ===== BUS ADDRESSES =====

/// TSL2561 light sensor.
pub const LIGHT_ADDRESS: u8 = 0x39;

/// SHT30 temperature and humidity sensor.
pub const CLIMATE_ADDRESS: u8 = 0x44;

/// ADS1115 analog to digital converter (MQ-135 on the first input).
pub const ADC_ADDRESS: u8 = 0x48;

/// BMP180 pressure sensor.
pub const PRESSURE_ADDRESS: u8 = 0x77;

// ===== ANALOG TO DIGITAL CONVERTER =====

/// Maximum positive count of the ADS1115 at gain 1.
pub const ADC_FULL_SCALE_COUNT: f64 = 32767.0;

/// Full-scale input voltage of the ADS1115 at gain 1 (V).
pub const ADC_REFERENCE_VOLTAGE: f64 = 4.096;

/// Number of single-ended ADC inputs.
pub const ADC_CHANNEL_COUNT: usize = 4;

// ===== CLIMATE SENSOR =====

/// Full-scale raw value of the SHT30 temperature and humidity words.
pub const CLIMATE_RAW_FULL_SCALE: f64 = 65535.0;

/// SHT30 temperature offset (°C).
pub const CLIMATE_TEMPERATURE_OFFSET_C: f64 = -45.0;

/// SHT30 temperature span (°C).
pub const CLIMATE_TEMPERATURE_SPAN_C: f64 = 175.0;

// ===== PRESSURE SENSOR =====

/// Standard sea level pressure used for the altitude estimate (Pa).
pub const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;

/// Barometric formula scale from the BMP180 datasheet (m).
pub const ALTITUDE_SCALE_M: f64 = 44_330.0;

/// Barometric formula exponent from the BMP180 datasheet.
pub const ALTITUDE_EXPONENT: f64 = 5.255;

/// Pascal to hectopascal.
pub const PA_TO_HPA: f64 = 0.01;
