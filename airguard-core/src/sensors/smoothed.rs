//! Per-channel smoothing inside the sampling loop

use std::time::Duration;

use crate::constants::filters::{READER_SMOOTHING_ALPHA, READER_SMOOTHING_WINDOW};
use crate::errors::{FilterResult, TransducerError};
use crate::filter::SignalFilter;
use crate::traits::{Channels, Transducer};

/// Transducer adapter that runs every decoded channel through its own filter
///
/// Failed reads pass through untouched and leave the filters alone.
pub struct Smoothed<T: Transducer> {
    inner: T,
    filters: Vec<SignalFilter>,
    round_whole: bool,
}

impl<T> Smoothed<T>
where
    T: Transducer,
    T::Sample: Channels,
{
    /// Low-pass every channel of `inner`
    pub fn low_pass(inner: T, window_size: usize, alpha: f64) -> FilterResult<Self> {
        let filters = (0..T::Sample::COUNT)
            .map(|_| SignalFilter::low_pass(window_size, alpha))
            .collect::<FilterResult<Vec<_>>>()?;
        Ok(Self { inner, filters, round_whole: false })
    }

    /// Low-pass with the station's reader smoothing defaults
    pub fn with_defaults(inner: T) -> FilterResult<Self> {
        Self::low_pass(inner, READER_SMOOTHING_WINDOW, READER_SMOOTHING_ALPHA)
    }

    /// Round smoothed channels to whole units
    pub fn rounded(mut self) -> Self {
        self.round_whole = true;
        self
    }

    /// Wrapped transducer
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> Transducer for Smoothed<T>
where
    T: Transducer,
    T::Sample: Channels,
{
    type Sample = T::Sample;

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn address(&self) -> u8 {
        self.inner.address()
    }

    fn probe(&mut self) -> bool {
        self.inner.probe()
    }

    fn select(&mut self) -> Result<(), TransducerError> {
        self.inner.select()
    }

    fn read_raw(&mut self) -> Result<Self::Sample, TransducerError> {
        let mut sample = self.inner.read_raw()?;
        for (index, filter) in self.filters.iter_mut().enumerate() {
            let mut value = filter.filter_value(sample.channel(index));
            if self.round_whole {
                value = libm::round(value);
            }
            sample.set_channel(index, value);
        }
        Ok(sample)
    }

    fn sample_interval(&self) -> Duration {
        self.inner.sample_interval()
    }

    fn backoff_interval(&self) -> Duration {
        self.inner.backoff_interval()
    }

    fn close(&mut self) {
        self.inner.close()
    }
}
