//! Streaming Signal Filters
//!
//! ## Overview
//!
//! A [`SignalFilter`] turns a stream of raw scalar readings into a smoothed
//! stream. Each call to [`SignalFilter::filter_value`] consumes one sample and
//! returns one output. Filters do no I/O and hold no locks; each one is owned
//! by exactly one published quantity.
//!
//! ## Filter Kinds
//!
//! ### Moving average
//!
//! Averages the retained window. The divisor is the number of samples
//! currently held, not the configured window, so the first output after a
//! reset is the input itself and full smoothing is reached once the window
//! fills:
//!
//! ```text
//! window = 3, input [10, 20, 30, 40]
//! output [10, 15, 20, 30]
//! ```
//!
//! The running sum is maintained incrementally: the evicted sample is
//! subtracted before the new one is added.
//!
//! ### Exponential low-pass
//!
//! ```text
//! y[0] = x[0]
//! y[i] = y[i-1] + alpha * (x[i] - y[i-1])
//! ```
//!
//! ### Exponential high-pass
//!
//! ```text
//! y[0] = x[0]
//! y[i] = alpha * y[i-1] + alpha * (x[i] - x[i-1])
//! ```
//!
//! Both exponential kinds return the input unchanged until two samples are
//! retained, then recompute the whole series over the retained window on
//! every call and return its last element. Changing alpha therefore reshapes
//! the visible window on the very next call, and the cost of a call is
//! bounded by the window size.
//!
//! ## Readiness
//!
//! A filter is ready once a tenth of its window has been filled (rounded up).
//! Readiness is a warm-up hint for consumers, not an error condition.
//!
//! ## Example
//!
//! ```rust
//! use airguard_core::SignalFilter;
//!
//! let mut filter = SignalFilter::low_pass(10, 0.5)?;
//! assert_eq!(filter.filter_value(10.0), 10.0);
//! assert_eq!(filter.filter_value(20.0), 15.0);
//! # Ok::<(), airguard_core::FilterError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::buffer::SampleWindow;
use crate::constants::filters::{DEFAULT_HIGH_PASS_ALPHA, DEFAULT_LOW_PASS_ALPHA, READINESS_DIVISOR};
use crate::errors::{FilterError, FilterResult};

/// Available filter algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Arithmetic mean of the retained window
    MovingAverage,
    /// Exponential low-pass smoothing
    LowPass,
    /// Exponential high-pass
    HighPass,
}

/// Per-kind state, dispatched once per sample
#[derive(Debug, Clone)]
enum FilterState {
    MovingAverage { sum: f64 },
    LowPass { output: Vec<f64> },
    HighPass { output: Vec<f64> },
}

impl FilterState {
    fn new(kind: FilterKind) -> Self {
        match kind {
            FilterKind::MovingAverage => Self::MovingAverage { sum: 0.0 },
            FilterKind::LowPass => Self::LowPass { output: Vec::new() },
            FilterKind::HighPass => Self::HighPass { output: Vec::new() },
        }
    }

    fn kind(&self) -> FilterKind {
        match self {
            Self::MovingAverage { .. } => FilterKind::MovingAverage,
            Self::LowPass { .. } => FilterKind::LowPass,
            Self::HighPass { .. } => FilterKind::HighPass,
        }
    }
}

/// Stateful streaming filter over scalar samples
#[derive(Debug, Clone)]
pub struct SignalFilter {
    state: FilterState,
    window: SampleWindow,
    low_pass_alpha: f64,
    high_pass_alpha: f64,
}

impl SignalFilter {
    /// Create a filter of the given kind with default alphas
    pub fn new(kind: FilterKind, window_size: usize) -> FilterResult<Self> {
        validate_window(window_size)?;
        Ok(Self {
            state: FilterState::new(kind),
            window: SampleWindow::new(window_size),
            low_pass_alpha: DEFAULT_LOW_PASS_ALPHA,
            high_pass_alpha: DEFAULT_HIGH_PASS_ALPHA,
        })
    }

    /// Moving average over `window_size` samples
    pub fn moving_average(window_size: usize) -> FilterResult<Self> {
        Self::new(FilterKind::MovingAverage, window_size)
    }

    /// Exponential low-pass over `window_size` samples
    pub fn low_pass(window_size: usize, alpha: f64) -> FilterResult<Self> {
        let mut filter = Self::new(FilterKind::LowPass, window_size)?;
        filter.set_low_pass_alpha(alpha)?;
        Ok(filter)
    }

    /// Exponential high-pass over `window_size` samples
    pub fn high_pass(window_size: usize, alpha: f64) -> FilterResult<Self> {
        let mut filter = Self::new(FilterKind::HighPass, window_size)?;
        filter.set_high_pass_alpha(alpha)?;
        Ok(filter)
    }

    /// Feed one sample and return the filtered value
    pub fn filter_value(&mut self, value: f64) -> f64 {
        match &mut self.state {
            FilterState::MovingAverage { sum } => {
                if self.window.is_empty() {
                    self.window.push(value);
                    *sum = value;
                    return value;
                }

                if let Some(evicted) = self.window.push(value) {
                    *sum -= evicted;
                }
                *sum += value;
                *sum / self.window.len() as f64
            }
            FilterState::LowPass { output } => {
                self.window.push(value);
                if self.window.len() < 2 {
                    return value;
                }

                let alpha = self.low_pass_alpha;
                recompute(&self.window, output, |y_prev, _, x| y_prev + alpha * (x - y_prev));
                output.last().copied().unwrap_or(value)
            }
            FilterState::HighPass { output } => {
                self.window.push(value);
                if self.window.len() < 2 {
                    return value;
                }

                let alpha = self.high_pass_alpha;
                recompute(&self.window, output, |y_prev, x_prev, x| {
                    alpha * y_prev + alpha * (x - x_prev)
                });
                output.last().copied().unwrap_or(value)
            }
        }
    }

    /// True once `ceil(window_size / 10)` samples have been supplied
    pub fn is_ready(&self) -> bool {
        self.window.len() * READINESS_DIVISOR >= self.window.capacity()
    }

    /// Clear history (and the running sum) without touching configuration
    pub fn reset(&mut self) {
        self.window.clear();
        match &mut self.state {
            FilterState::MovingAverage { sum } => *sum = 0.0,
            FilterState::LowPass { output } | FilterState::HighPass { output } => output.clear(),
        }
    }

    /// Filter algorithm
    pub fn kind(&self) -> FilterKind {
        self.state.kind()
    }

    /// Configured window size
    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }

    /// Change the window size, evicting the oldest samples that no longer fit
    pub fn set_window_size(&mut self, window_size: usize) -> FilterResult<()> {
        validate_window(window_size)?;
        let evicted = self.window.set_capacity(window_size);
        if let FilterState::MovingAverage { sum } = &mut self.state {
            if !evicted.is_empty() {
                *sum = self.window.iter().sum();
            }
        }
        Ok(())
    }

    /// Low-pass smoothing factor
    pub fn low_pass_alpha(&self) -> f64 {
        self.low_pass_alpha
    }

    /// Set the low-pass smoothing factor, `0 < alpha <= 1`
    pub fn set_low_pass_alpha(&mut self, alpha: f64) -> FilterResult<()> {
        self.low_pass_alpha = validate_alpha(alpha)?;
        Ok(())
    }

    /// High-pass factor
    pub fn high_pass_alpha(&self) -> f64 {
        self.high_pass_alpha
    }

    /// Set the high-pass factor, `0 < alpha <= 1`
    pub fn set_high_pass_alpha(&mut self, alpha: f64) -> FilterResult<()> {
        self.high_pass_alpha = validate_alpha(alpha)?;
        Ok(())
    }

    /// Retained raw samples, oldest first
    pub fn input_data(&self) -> Vec<f64> {
        self.window.to_vec()
    }

    /// Last recomputed exponential series (empty for the moving average)
    pub fn output_data(&self) -> &[f64] {
        match &self.state {
            FilterState::MovingAverage { .. } => &[],
            FilterState::LowPass { output } | FilterState::HighPass { output } => output,
        }
    }

    /// Running sum of the retained window (moving average only)
    pub fn running_sum(&self) -> Option<f64> {
        match self.state {
            FilterState::MovingAverage { sum } => Some(sum),
            _ => None,
        }
    }
}

/// Rebuild `output` from the retained window: `y[0] = x[0]`, then
/// `y[i] = step(y[i-1], x[i-1], x[i])`
fn recompute<F>(window: &SampleWindow, output: &mut Vec<f64>, step: F)
where
    F: Fn(f64, f64, f64) -> f64,
{
    output.clear();
    let mut previous_input = None;
    for &x in window.iter() {
        let y = match (previous_input, output.last()) {
            (Some(x_prev), Some(&y_prev)) => step(y_prev, x_prev, x),
            _ => x,
        };
        output.push(y);
        previous_input = Some(x);
    }
}

fn validate_window(window_size: usize) -> FilterResult<()> {
    if window_size == 0 {
        return Err(FilterError::ZeroWindow);
    }
    Ok(())
}

fn validate_alpha(alpha: f64) -> FilterResult<f64> {
    if alpha > 0.0 && alpha <= 1.0 {
        Ok(alpha)
    } else {
        Err(FilterError::AlphaOutOfRange { alpha })
    }
}

/// Declarative filter settings, as found in station configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Algorithm
    pub kind: FilterKind,
    /// Number of retained samples
    pub window_size: usize,
    /// Alpha for the exponential kinds; defaults apply when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

impl FilterConfig {
    /// Moving average settings
    pub const fn moving_average(window_size: usize) -> Self {
        Self { kind: FilterKind::MovingAverage, window_size, alpha: None }
    }

    /// Low-pass settings
    pub const fn low_pass(window_size: usize, alpha: f64) -> Self {
        Self { kind: FilterKind::LowPass, window_size, alpha: Some(alpha) }
    }

    /// High-pass settings
    pub const fn high_pass(window_size: usize, alpha: f64) -> Self {
        Self { kind: FilterKind::HighPass, window_size, alpha: Some(alpha) }
    }

    /// Build a fresh filter, rejecting invalid settings
    pub fn build(&self) -> FilterResult<SignalFilter> {
        let mut filter = SignalFilter::new(self.kind, self.window_size)?;
        if let Some(alpha) = self.alpha {
            match self.kind {
                FilterKind::LowPass => filter.set_low_pass_alpha(alpha)?,
                FilterKind::HighPass => filter.set_high_pass_alpha(alpha)?,
                FilterKind::MovingAverage => {
                    validate_alpha(alpha)?;
                }
            }
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn feed(filter: &mut SignalFilter, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| filter.filter_value(v)).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn moving_average_warms_up_then_evicts() {
        let mut filter = SignalFilter::moving_average(3).unwrap();
        assert_eq!(feed(&mut filter, &[10.0, 20.0, 30.0, 40.0]), vec![10.0, 15.0, 20.0, 30.0]);
        assert_eq!(filter.input_data(), vec![20.0, 30.0, 40.0]);
        assert_eq!(filter.running_sum(), Some(90.0));
    }

    #[test]
    fn low_pass_smooths_from_second_sample() {
        let mut filter = SignalFilter::low_pass(10, 0.5).unwrap();
        assert_eq!(feed(&mut filter, &[10.0, 20.0]), vec![10.0, 15.0]);
        assert_eq!(filter.output_data(), &[10.0, 15.0]);
    }

    #[test]
    fn low_pass_recomputes_over_retained_window() {
        let mut filter = SignalFilter::low_pass(2, 0.5).unwrap();
        feed(&mut filter, &[0.0, 10.0]);

        // 0.0 is evicted, the series restarts at 10.0
        assert_eq!(filter.filter_value(20.0), 15.0);
    }

    #[test]
    fn low_pass_alpha_change_reshapes_window() {
        let mut filter = SignalFilter::low_pass(10, 0.5).unwrap();
        feed(&mut filter, &[10.0, 20.0]);

        filter.set_low_pass_alpha(1.0).unwrap();
        assert_eq!(filter.filter_value(30.0), 30.0);
        assert_eq!(filter.output_data(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn high_pass_uses_alpha_on_both_terms() {
        let mut filter = SignalFilter::high_pass(10, 0.5).unwrap();
        let out = feed(&mut filter, &[10.0, 20.0, 20.0]);

        // y1 = 0.5*10 + 0.5*(20-10) = 10, y2 = 0.5*10 + 0.5*0 = 5
        assert_eq!(out, vec![10.0, 10.0, 5.0]);
    }

    #[test]
    fn low_pass_alpha_one_is_identity() {
        let mut filter = SignalFilter::low_pass(4, 1.0).unwrap();
        for x in [3.0, -7.5, 12.25, 0.0, 99.0, 1e6] {
            assert_eq!(filter.filter_value(x), x);
        }
    }

    #[test]
    fn reset_behaves_like_fresh_filter() {
        let mut used = SignalFilter::moving_average(4).unwrap();
        feed(&mut used, &[1.0, 100.0, -50.0, 7.0, 3.0]);
        used.reset();

        let mut fresh = SignalFilter::moving_average(4).unwrap();
        let input = [5.0; 6];
        assert_eq!(feed(&mut used, &input), feed(&mut fresh, &input));
        assert_eq!(used.window_size(), 4);
        assert!(used.output_data().is_empty());
    }

    #[test]
    fn reset_keeps_configuration() {
        let mut filter = SignalFilter::high_pass(6, 0.25).unwrap();
        feed(&mut filter, &[1.0, 2.0, 3.0]);
        filter.reset();

        assert_eq!(filter.kind(), FilterKind::HighPass);
        assert_eq!(filter.window_size(), 6);
        assert_eq!(filter.high_pass_alpha(), 0.25);
        assert!(filter.input_data().is_empty());
        assert!(filter.output_data().is_empty());
    }

    #[test]
    fn readiness_after_a_tenth_of_the_window() {
        let mut filter = SignalFilter::moving_average(25).unwrap();
        for _ in 0..2 {
            assert!(!filter.is_ready());
            filter.filter_value(1.0);
        }
        assert!(!filter.is_ready());
        filter.filter_value(1.0);
        assert!(filter.is_ready());

        for _ in 0..100 {
            filter.filter_value(1.0);
            assert!(filter.is_ready());
        }
    }

    #[test]
    fn small_windows_are_ready_after_one_sample() {
        let mut filter = SignalFilter::low_pass(3, 0.3).unwrap();
        assert!(!filter.is_ready());
        filter.filter_value(1.0);
        assert!(filter.is_ready());
    }

    #[test]
    fn misconfiguration_rejected() {
        assert_eq!(SignalFilter::moving_average(0).unwrap_err(), FilterError::ZeroWindow);
        assert!(matches!(
            SignalFilter::low_pass(5, 0.0),
            Err(FilterError::AlphaOutOfRange { .. })
        ));
        assert!(matches!(
            SignalFilter::high_pass(5, 1.01),
            Err(FilterError::AlphaOutOfRange { .. })
        ));
        assert!(SignalFilter::low_pass(5, f64::NAN).is_err());

        let mut filter = SignalFilter::low_pass(5, 0.5).unwrap();
        assert_eq!(filter.set_window_size(0), Err(FilterError::ZeroWindow));
        assert!(filter.set_low_pass_alpha(-0.1).is_err());
        // Rejected values leave the filter untouched
        assert_eq!(filter.window_size(), 5);
        assert_eq!(filter.low_pass_alpha(), 0.5);
    }

    #[test]
    fn shrinking_window_keeps_sum_consistent() {
        let mut filter = SignalFilter::moving_average(4).unwrap();
        feed(&mut filter, &[1.0, 2.0, 3.0, 4.0]);

        filter.set_window_size(2).unwrap();
        assert_eq!(filter.running_sum(), Some(7.0));
        assert_eq!(filter.filter_value(6.0), 5.0);
    }

    #[test]
    fn config_builds_matching_filter() {
        let filter = FilterConfig::low_pass(5, 0.4).build().unwrap();
        assert_eq!(filter.kind(), FilterKind::LowPass);
        assert_eq!(filter.window_size(), 5);
        assert_eq!(filter.low_pass_alpha(), 0.4);

        let filter = FilterConfig::moving_average(3).build().unwrap();
        assert_eq!(filter.kind(), FilterKind::MovingAverage);

        assert!(FilterConfig::high_pass(0, 0.5).build().is_err());
        assert!(FilterConfig::high_pass(3, 2.0).build().is_err());
    }

    #[test]
    fn config_deserializes_snake_case_kinds() {
        let config: FilterConfig =
            serde_json::from_str(r#"{"kind":"low_pass","window_size":5,"alpha":0.4}"#).unwrap();
        assert_eq!(config, FilterConfig::low_pass(5, 0.4));

        let config: FilterConfig =
            serde_json::from_str(r#"{"kind":"moving_average","window_size":3}"#).unwrap();
        assert_eq!(config, FilterConfig::moving_average(3));
    }

    proptest! {
        #[test]
        fn moving_average_of_constant_is_constant(
            v in -1.0e6f64..1.0e6,
            window in 1usize..64,
            calls in 1usize..200,
        ) {
            let mut filter = SignalFilter::moving_average(window).unwrap();
            for _ in 0..calls {
                let out = filter.filter_value(v);
                prop_assert!(close(out, v), "{} != {}", out, v);
            }
        }

        #[test]
        fn window_never_exceeds_configuration(
            values in proptest::collection::vec(-1.0e3f64..1.0e3, 0..300),
            window in 1usize..32,
            kind in prop_oneof![
                Just(FilterKind::MovingAverage),
                Just(FilterKind::LowPass),
                Just(FilterKind::HighPass),
            ],
        ) {
            let mut filter = SignalFilter::new(kind, window).unwrap();
            for v in values {
                filter.filter_value(v);
                prop_assert!(filter.input_data().len() <= window);
            }
        }

        #[test]
        fn running_sum_tracks_window(
            values in proptest::collection::vec(-1.0e3f64..1.0e3, 1..300),
            window in 1usize..32,
        ) {
            let mut filter = SignalFilter::moving_average(window).unwrap();
            for v in values {
                filter.filter_value(v);
                let expected: f64 = filter.input_data().iter().sum();
                let sum = filter.running_sum().unwrap();
                prop_assert!((sum - expected).abs() < 1e-6, "{} != {}", sum, expected);
            }
        }
    }
}
