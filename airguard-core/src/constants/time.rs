//! Sampling and Measurement Cadence

/// Pause between two samples of a reader (ms).
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 500;

/// Pause before retrying after a bus addressing failure (ms).
pub const DEFAULT_BACKOFF_INTERVAL_MS: u64 = 500;

/// Period between two station measurements (s). Five minutes.
pub const DEFAULT_MEASURE_PERIOD_SECS: u64 = 300;

/// Slower period used by battery-friendly deployments (s). Ten minutes.
pub const SLOW_MEASURE_PERIOD_SECS: u64 = 600;

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;
