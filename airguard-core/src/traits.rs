//! Collaborator traits
//!
//! The core never talks to a bus, a host framework or a timer directly.
//! Each of those is a trait implemented outside this crate (or by the small
//! std-backed implementations in [`crate::scheduler`] and the connectors
//! crate). Keep them narrow: a transducer only has to say whether it is
//! present and hand back one decoded sample at a time.

use std::time::Duration;

use crate::constants::time::{DEFAULT_BACKOFF_INTERVAL_MS, DEFAULT_SAMPLE_INTERVAL_MS};
use crate::errors::{SchedulerError, TransducerError};
use crate::measurement::{Measurement, Quantity};

/// One physical device sampled by a [`crate::reader::ContinuousReader`]
///
/// All calls are synchronous and happen on the reader's own thread, except
/// [`Transducer::probe`] which runs on the thread calling `enable`.
pub trait Transducer: Send + 'static {
    /// Decoded reading published by the reader
    type Sample: Copy + Default + Send + 'static;

    /// Short device name for logs
    fn name(&self) -> &'static str;

    /// Bus address of the device
    fn address(&self) -> u8;

    /// Lightweight open/close check that the device answers on its address
    fn probe(&mut self) -> bool;

    /// Claim the bus for this device's address before a transfer
    fn select(&mut self) -> Result<(), TransducerError> {
        Ok(())
    }

    /// Read and decode one sample
    fn read_raw(&mut self) -> Result<Self::Sample, TransducerError>;

    /// Pause between two samples
    fn sample_interval(&self) -> Duration {
        Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS)
    }

    /// Pause before retrying after a failed [`Transducer::select`]
    fn backoff_interval(&self) -> Duration {
        Duration::from_millis(DEFAULT_BACKOFF_INTERVAL_MS)
    }

    /// Release the bus handle when the sampling loop exits
    fn close(&mut self) {}
}

/// Type-erased transducer producing samples of type `S`
pub type BoxedTransducer<S> = Box<dyn Transducer<Sample = S>>;

impl<S> Transducer for Box<dyn Transducer<Sample = S>>
where
    S: Copy + Default + Send + 'static,
{
    type Sample = S;

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn address(&self) -> u8 {
        (**self).address()
    }

    fn probe(&mut self) -> bool {
        (**self).probe()
    }

    fn select(&mut self) -> Result<(), TransducerError> {
        (**self).select()
    }

    fn read_raw(&mut self) -> Result<S, TransducerError> {
        (**self).read_raw()
    }

    fn sample_interval(&self) -> Duration {
        (**self).sample_interval()
    }

    fn backoff_interval(&self) -> Duration {
        (**self).backoff_interval()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Samples made of independent scalar channels
pub trait Channels: Copy + Default + Send + 'static {
    /// Number of channels
    const COUNT: usize;

    /// Value of channel `index`
    fn channel(&self, index: usize) -> f64;

    /// Overwrite channel `index`
    fn set_channel(&mut self, index: usize, value: f64);
}

/// Receiver of published measurements
///
/// Calls are best effort from the station's point of view: a sink that
/// cannot deliver should log and drop, never block.
pub trait Sink: Send {
    /// Mark the sensor group as connected or not
    fn set_available(&mut self, _available: bool) {}

    /// Publish one quantity
    fn publish(&mut self, quantity: Quantity, value: f64);

    /// Publish a complete measurement cycle
    fn publish_all(&mut self, measurement: &Measurement) {
        for (quantity, value) in measurement.published() {
            self.publish(quantity, value);
        }
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn set_available(&mut self, available: bool) {
        (**self).set_available(available)
    }

    fn publish(&mut self, quantity: Quantity, value: f64) {
        (**self).publish(quantity, value)
    }

    fn publish_all(&mut self, measurement: &Measurement) {
        (**self).publish_all(measurement)
    }
}

/// Identifies a registered periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub(crate) u64);

impl TimerHandle {
    /// Handle with a scheduler-specific id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Scheduler-specific id
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Periodic task scheduler
pub trait Scheduler {
    /// Run `task` every `period` until unregistered
    fn register(
        &mut self,
        period: Duration,
        task: Box<dyn FnMut() + Send>,
    ) -> Result<TimerHandle, SchedulerError>;

    /// Stop a task; unknown handles are ignored
    fn unregister(&mut self, handle: TimerHandle);
}
