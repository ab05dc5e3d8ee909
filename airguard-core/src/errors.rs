//! Error Types for Filtering, Sampling and Station Lifecycle
//!
//! ## Design Philosophy
//!
//! AirGuard separates faults by *when* they can happen:
//!
//! 1. **Configuration time**: a filter with a zero window or an alpha outside
//!    `(0, 1]` is a programming error. It is rejected when the filter is built
//!    or tuned, never clamped and never discovered while filtering.
//!
//! 2. **Sampling time**: bus addressing and read failures inside a reader's
//!    background loop are transient. They are logged and the loop carries on,
//!    so these errors never reach the consumer. The type still exists because
//!    transducer collaborators report through it.
//!
//! 3. **Lifecycle**: activating a station group that is already active is
//!    refused with a distinguishable status and creates no state.
//!
//! Errors without owned data are `Copy` so they can be returned from hot paths
//! and compared in tests.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use airguard_core::{FilterError, SignalFilter};
//!
//! match SignalFilter::low_pass(10, 1.5) {
//!     Ok(_) => unreachable!(),
//!     Err(FilterError::AlphaOutOfRange { alpha }) => assert_eq!(alpha, 1.5),
//!     Err(other) => panic!("unexpected: {other}"),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for filter configuration
pub type FilterResult<T> = Result<T, FilterError>;

/// Filter misconfiguration, reported when the filter is configured
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FilterError {
    /// Window size must hold at least one sample
    #[error("Filter window size must be bigger than 0")]
    ZeroWindow,

    /// Alpha must satisfy `0 < alpha <= 1`
    #[error("Filter alpha {alpha} outside (0, 1]")]
    AlphaOutOfRange {
        /// The rejected alpha
        alpha: f64,
    },
}

/// Faults reported by a transducer collaborator
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransducerError {
    /// Could not claim the bus for this device's address
    #[error("Could not select I2C address 0x{address:02x}")]
    BusAddressing {
        /// Device address on the bus
        address: u8,
    },

    /// Device answered but the sample could not be read or decoded
    #[error("Read failed: {reason}")]
    Read {
        /// Short description of what went wrong
        reason: &'static str,
    },

    /// Device is not present on the bus
    #[error("Transducer not available")]
    Unavailable,
}

/// Station lifecycle errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StationError {
    /// Another station already owns this sensor group
    #[error("Sensor group '{group}' is already active")]
    AlreadyActive {
        /// Name of the contested group
        group: String,
    },

    /// One of the configured filters is invalid
    #[error("Invalid filter configuration: {0}")]
    Filter(#[from] FilterError),
    /// The station configuration failed validation
    #[error("Invalid station configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration parsing and validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The document is not valid JSON for [`crate::config::StationConfig`]
    #[error("Could not parse configuration: {0}")]
    Parse(String),

    /// A filter section is invalid
    #[error("Invalid filter configuration: {0}")]
    Filter(#[from] FilterError),
    /// A value is outside its allowed range
    #[error("Invalid value for '{field}'")]
    Invalid {
        /// Offending setting
        field: &'static str,
    },
}

/// Scheduler errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// The timer thread could not be started
    #[error("Could not spawn timer thread")]
    Spawn,
}
