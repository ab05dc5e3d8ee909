//! Core sampling and filtering engine for AirGuard
//!
//! Samples a set of environmental sensors on background threads, smooths
//! each quantity with a streaming filter and estimates CO2 concentration
//! from an MQ-135 gas sensor. A [`Station`] ties it together: an external
//! scheduler calls [`Station::measure`] every few minutes and the result is
//! forwarded to a [`Sink`].
//!
//! Key constraints:
//! - Reader accessors and `measure()` never wait on bus I/O
//! - One sampling thread per device, joined on shutdown
//! - One live station per sensor group
//!
//! ```no_run
//! use airguard_core::{Station, StationConfig, StationHardware, StationRegistry, Sink, Quantity};
//!
//! struct Print;
//!
//! impl Sink for Print {
//!     fn publish(&mut self, quantity: Quantity, value: f64) {
//!         println!("{} = {} {}", quantity, value, quantity.unit());
//!     }
//! }
//!
//! # fn hardware() -> StationHardware { unimplemented!() }
//! let registry = StationRegistry::new();
//! let mut station = Station::setup(&registry, StationConfig::default(), hardware(), Print)?;
//! station.enable();
//! station.measure();
//! # Ok::<(), airguard_core::StationError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod buffer;
pub mod config;
pub mod constants;
pub mod debug_log;
pub mod errors;
pub mod estimator;
pub mod filter;
pub mod measurement;
pub mod reader;
pub mod scheduler;
pub mod sensors;
pub mod station;
pub mod time;
pub mod traits;

// Public API
pub use config::{GasConfig, QuantityFilters, StationConfig};
pub use errors::{
    ConfigError, FilterError, FilterResult, SchedulerError, StationError, TransducerError,
};
pub use estimator::GasEstimator;
pub use filter::{FilterConfig, FilterKind, SignalFilter};
pub use measurement::{Measurement, Quantity, QuantityReading};
pub use reader::ContinuousReader;
pub use scheduler::{schedule_station, IntervalScheduler};
pub use station::{GroupLease, Station, StationHardware, StationRegistry};
pub use traits::{BoxedTransducer, Channels, Scheduler, Sink, TimerHandle, Transducer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
