//! ADS1115 four-channel converter samples

use serde::{Deserialize, Serialize};

use crate::constants::sensors::{ADC_CHANNEL_COUNT, ADC_FULL_SCALE_COUNT, ADC_REFERENCE_VOLTAGE};
use crate::reader::ContinuousReader;
use crate::traits::{Channels, Transducer};

/// Single-ended converter input, configured by zero-based index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum AdcChannel {
    /// AIN0
    Channel1 = 0,
    /// AIN1
    Channel2 = 1,
    /// AIN2
    Channel3 = 2,
    /// AIN3
    Channel4 = 3,
}

impl AdcChannel {
    /// Channel for a zero-based input index
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Channel1),
            1 => Some(Self::Channel2),
            2 => Some(Self::Channel3),
            3 => Some(Self::Channel4),
            _ => None,
        }
    }

    /// Zero-based input index
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for AdcChannel {
    type Error = &'static str;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or("ADC channel index must be 0..=3")
    }
}

impl From<AdcChannel> for usize {
    fn from(channel: AdcChannel) -> Self {
        channel.index()
    }
}

/// One conversion of every input, stored together so readers never see a
/// mix of two conversion rounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdcSample {
    /// Raw counts, indexed by [`AdcChannel::index`]
    pub counts: [i32; ADC_CHANNEL_COUNT],
}

impl AdcSample {
    /// Sample from raw counts
    pub const fn new(counts: [i32; ADC_CHANNEL_COUNT]) -> Self {
        Self { counts }
    }

    /// Count on `channel`
    pub fn channel(&self, channel: AdcChannel) -> i32 {
        self.counts[channel.index()]
    }

    /// Voltage on `channel` at gain 1
    pub fn voltage(&self, channel: AdcChannel) -> f64 {
        count_to_voltage(self.channel(channel))
    }
}

/// Convert a raw count to volts at gain 1
pub fn count_to_voltage(count: i32) -> f64 {
    f64::from(count) * ADC_REFERENCE_VOLTAGE / ADC_FULL_SCALE_COUNT
}

impl Channels for AdcSample {
    const COUNT: usize = ADC_CHANNEL_COUNT;

    fn channel(&self, index: usize) -> f64 {
        self.counts.get(index).copied().map(f64::from).unwrap_or_default()
    }

    fn set_channel(&mut self, index: usize, value: f64) {
        if let Some(count) = self.counts.get_mut(index) {
            *count = libm::round(value) as i32;
        }
    }
}

impl<T: Transducer<Sample = AdcSample>> ContinuousReader<T> {
    /// Latest raw count on `channel`, 0 before the first conversion
    pub fn current_channel_value(&self, channel: AdcChannel) -> i32 {
        self.current().channel(channel)
    }

    /// Latest voltage on `channel`
    pub fn current_channel_voltage(&self, channel: AdcChannel) -> f64 {
        self.current().voltage(channel)
    }
}
