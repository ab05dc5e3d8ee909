//! Sensor Station: Readers, Filters and the Measurement Tick
//!
//! ## Overview
//!
//! A [`Station`] owns one [`ContinuousReader`] per device and one
//! [`SignalFilter`] per published quantity. Readers sample on their own
//! threads; the station only looks at their cached values when an external
//! scheduler calls [`Station::measure`].
//!
//! ```text
//!   climate ─┬─ temperature ──────────────────────> MA(3) ─┐
//!            └─ humidity ─────────────────────────> MA(3) ─┤
//!   pressure ── pressure ─────────────────────────> LP(5) ─┤  round
//!   light ───── lux ──────────────────────────────> MA(3) ─┼─ 2 dp ─> sink
//!   adc ─────── channel 1 ─┐                               │
//!   climate (T, RH) ───────┴─> GasEstimator (LP) ──> MA(5) ─┘
//! ```
//!
//! ## One Station per Group
//!
//! Stations are set up against a shared [`StationRegistry`]. Setting up a
//! second station for a group that is still owned by a live station fails
//! with [`StationError::AlreadyActive`] before any reader or filter exists;
//! the existing station keeps running. The group is released when its
//! station is dropped.
//!
//! ## Example
//!
//! ```rust,ignore
//! let registry = StationRegistry::new();
//! let mut station = Station::setup(&registry, StationConfig::default(), hardware, sink)?;
//! station.enable();
//! let measurement = station.measure();
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::StationConfig;
use crate::debug_log::DebugLog;
use crate::errors::{FilterResult, StationError};
use crate::estimator::GasEstimator;
use crate::filter::SignalFilter;
use crate::measurement::{Measurement, Quantity, QuantityReading};
use crate::reader::ContinuousReader;
use crate::sensors::{AdcSample, ClimateSample, LightSample, PressureSample, Smoothed};
use crate::time::{SystemTime, TimeSource};
use crate::traits::{BoxedTransducer, Sink};

type ActiveGroups = Arc<Mutex<HashSet<String>>>;

/// Set of sensor groups that currently have a live station
///
/// Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    active: ActiveGroups,
}

impl StationRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `group`, failing if it is already reserved
    pub fn claim(&self, group: &str) -> Result<GroupLease, StationError> {
        let mut active = lock(&self.active);
        if !active.insert(group.to_string()) {
            return Err(StationError::AlreadyActive { group: group.to_string() });
        }
        Ok(GroupLease { group: group.to_string(), active: Arc::clone(&self.active) })
    }

    /// True while a lease on `group` is alive
    pub fn is_active(&self, group: &str) -> bool {
        lock(&self.active).contains(group)
    }

    /// Number of reserved groups
    pub fn len(&self) -> usize {
        lock(&self.active).len()
    }

    /// True when no group is reserved
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reservation of one group; dropping it releases the group
#[derive(Debug)]
pub struct GroupLease {
    group: String,
    active: ActiveGroups,
}

impl GroupLease {
    /// Reserved group
    pub fn group(&self) -> &str {
        &self.group
    }
}

impl Drop for GroupLease {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.group);
    }
}

/// The four transducers of a station
pub struct StationHardware {
    /// Four-channel converter with the gas sensor on one input
    pub adc: BoxedTransducer<AdcSample>,
    /// Temperature and humidity
    pub climate: BoxedTransducer<ClimateSample>,
    /// Barometric pressure
    pub pressure: BoxedTransducer<PressureSample>,
    /// Visible light
    pub light: BoxedTransducer<LightSample>,
}

impl StationHardware {
    /// Low-pass climate and light samples inside their readers, with light
    /// rounded to whole lux
    pub fn with_reader_smoothing(self) -> FilterResult<Self> {
        Ok(Self {
            adc: self.adc,
            climate: Box::new(Smoothed::with_defaults(self.climate)?),
            pressure: self.pressure,
            light: Box::new(Smoothed::with_defaults(self.light)?.rounded()),
        })
    }
}

/// Station filter per published quantity
#[derive(Debug)]
struct QuantityFilterSet {
    temperature: SignalFilter,
    humidity: SignalFilter,
    pressure: SignalFilter,
    light: SignalFilter,
    co2: SignalFilter,
}

impl QuantityFilterSet {
    fn from_config(config: &StationConfig) -> FilterResult<Self> {
        let filters = &config.filters;
        Ok(Self {
            temperature: filters.temperature.build()?,
            humidity: filters.humidity.build()?,
            pressure: filters.pressure.build()?,
            light: filters.light.build()?,
            co2: filters.co2.build()?,
        })
    }

    fn get(&self, quantity: Quantity) -> &SignalFilter {
        match quantity {
            Quantity::Temperature => &self.temperature,
            Quantity::Humidity => &self.humidity,
            Quantity::Pressure => &self.pressure,
            Quantity::LightIntensity => &self.light,
            Quantity::Co2 => &self.co2,
        }
    }

    fn get_mut(&mut self, quantity: Quantity) -> &mut SignalFilter {
        match quantity {
            Quantity::Temperature => &mut self.temperature,
            Quantity::Humidity => &mut self.humidity,
            Quantity::Pressure => &mut self.pressure,
            Quantity::LightIntensity => &mut self.light,
            Quantity::Co2 => &mut self.co2,
        }
    }

    fn apply(&mut self, quantity: Quantity, raw: f64) -> QuantityReading {
        let filtered = self.get_mut(quantity).filter_value(raw);
        QuantityReading::new(quantity, raw, filtered)
    }
}

/// Measurement orchestrator for one sensor group
pub struct Station {
    config: StationConfig,
    adc: ContinuousReader<BoxedTransducer<AdcSample>>,
    climate: ContinuousReader<BoxedTransducer<ClimateSample>>,
    pressure: ContinuousReader<BoxedTransducer<PressureSample>>,
    light: ContinuousReader<BoxedTransducer<LightSample>>,
    estimator: GasEstimator,
    filters: QuantityFilterSet,
    sink: Box<dyn Sink>,
    debug_log: Option<DebugLog>,
    time: Box<dyn TimeSource>,
    enabled: bool,
    // Dropped after the readers have been joined
    lease: GroupLease,
}

impl Station {
    /// Claim `config.group` and build a disabled station
    ///
    /// Nothing is created when the group is already active or the
    /// configuration is invalid.
    pub fn setup(
        registry: &StationRegistry,
        config: StationConfig,
        hardware: StationHardware,
        sink: impl Sink + 'static,
    ) -> Result<Self, StationError> {
        let lease = registry.claim(&config.group)?;
        config.validate()?;

        let filters = QuantityFilterSet::from_config(&config)?;
        let estimator = GasEstimator::from_config(&config.gas)?;
        let hardware =
            if config.reader_smoothing { hardware.with_reader_smoothing()? } else { hardware };
        info!("Setting up sensor station '{}'", config.group);

        Ok(Self {
            adc: ContinuousReader::new(hardware.adc),
            climate: ContinuousReader::new(hardware.climate),
            pressure: ContinuousReader::new(hardware.pressure),
            light: ContinuousReader::new(hardware.light),
            estimator,
            filters,
            sink: Box::new(sink),
            debug_log: None,
            time: Box::new(SystemTime),
            enabled: false,
            lease,
            config,
        })
    }

    /// Stamp measurements from `time` instead of the wall clock
    pub fn with_time_source(mut self, time: impl TimeSource + 'static) -> Self {
        self.time = Box::new(time);
        self
    }

    /// Start every reader and mark the group available
    ///
    /// Returns `false` if any device failed its probe; the others keep
    /// sampling and the station is enabled either way.
    pub fn enable(&mut self) -> bool {
        let results = [
            self.adc.enable(),
            self.climate.enable(),
            self.pressure.enable(),
            self.light.enable(),
        ];
        let all_enabled = results.iter().all(|enabled| *enabled);
        if !all_enabled {
            warn!("Sensor station '{}': not all sensors are available", self.group());
        }

        self.sink.set_available(true);
        self.open_debug_log();
        self.enabled = true;
        debug!("Sensor station '{}' enabled", self.group());
        all_enabled
    }

    /// Stop every reader and mark the group unavailable
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.adc.disable();
        self.climate.disable();
        self.pressure.disable();
        self.light.disable();

        self.sink.set_available(false);
        self.enabled = false;
        debug!("Sensor station '{}' disabled", self.group());
    }

    /// Read every cached value, filter, round and publish as one update
    ///
    /// Never touches the bus. The CO2 quantity is missing from the result
    /// while the gas sensor's ADC count is not positive.
    pub fn measure(&mut self) -> Measurement {
        let climate = self.climate.current();
        let pressure = self.pressure.current_pressure();
        let lux = self.light.current_lux();
        let adc = self.adc.current_channel_value(self.config.gas.adc_channel);

        let mut readings = Vec::with_capacity(Quantity::ALL.len());
        readings.push(self.filters.apply(Quantity::Temperature, climate.temperature));
        readings.push(self.filters.apply(Quantity::Humidity, climate.humidity));
        readings.push(self.filters.apply(Quantity::Pressure, pressure));
        readings.push(self.filters.apply(Quantity::LightIntensity, lux));

        if adc > 0 {
            self.estimator.set_temperature(climate.temperature);
            self.estimator.set_humidity(climate.humidity);
            self.estimator.set_adc_value(adc);
            let ppm = self.estimator.calculate_ppm();
            debug!(
                "Air quality value {} {:.2} kOhm {:.4} V {} ppm",
                adc,
                self.estimator.calibration_resistance(),
                self.adc.current_channel_voltage(self.config.gas.adc_channel),
                ppm
            );
            readings.push(self.filters.apply(Quantity::Co2, ppm));
        } else {
            debug!("No positive gas sensor reading yet, skipping CO2");
        }

        debug!(
            "Temperature {} [°C] | Humidity {} [%] | Pressure {} [hPa] | Light intensity {} [lux]",
            climate.temperature, climate.humidity, pressure, lux
        );

        let measurement = Measurement { timestamp: self.time.now(), readings };
        self.sink.publish_all(&measurement);

        if let Some(log) = self.debug_log.as_mut() {
            if let Err(err) = log.write(&measurement) {
                warn!("Could not write to {}: {}", log.path().display(), err);
            }
        }

        measurement
    }

    /// True between [`Station::enable`] and [`Station::disable`]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sensor group owned by this station
    pub fn group(&self) -> &str {
        self.lease.group()
    }

    /// Period at which [`Station::measure`] should be called
    pub fn measure_period(&self) -> Duration {
        self.config.measure_period()
    }

    /// Active configuration
    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Gas estimator, for calibration diagnostics
    pub fn estimator(&self) -> &GasEstimator {
        &self.estimator
    }

    /// Station filter of `quantity`
    pub fn filter(&self, quantity: Quantity) -> &SignalFilter {
        self.filters.get(quantity)
    }

    /// True when every reader has a running sampling loop
    pub fn all_readers_running(&self) -> bool {
        self.adc.is_running()
            && self.climate.is_running()
            && self.pressure.is_running()
            && self.light.is_running()
    }

    /// True when no reader has a sampling thread left
    pub fn all_readers_stopped(&self) -> bool {
        !self.adc.is_active()
            && !self.climate.is_active()
            && !self.pressure.is_active()
            && !self.light.is_active()
    }

    fn open_debug_log(&mut self) {
        if self.debug_log.is_some() {
            return;
        }
        let Some(path) = self.config.debug_log.as_ref() else {
            return;
        };
        match DebugLog::open(path) {
            Ok(log) => self.debug_log = Some(log),
            Err(err) => warn!("Could not open logfile {}: {}", path.display(), err),
        }
    }
}

impl Drop for Station {
    fn drop(&mut self) {
        self.disable();
    }
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ConfigError, FilterError, TransducerError};
    use crate::filter::FilterConfig;
    use crate::time::FixedTime;
    use crate::traits::Transducer;

    #[derive(Clone, Copy)]
    struct Fixed<S>(S);

    impl<S: Copy + Default + Send + 'static> Transducer for Fixed<S> {
        type Sample = S;

        fn name(&self) -> &'static str {
            "Fixed"
        }

        fn address(&self) -> u8 {
            0x20
        }

        fn probe(&mut self) -> bool {
            true
        }

        fn read_raw(&mut self) -> Result<S, TransducerError> {
            Ok(self.0)
        }

        fn sample_interval(&self) -> Duration {
            Duration::from_millis(1)
        }
    }

    #[derive(Default)]
    struct NullSink;

    impl Sink for NullSink {
        fn publish(&mut self, _quantity: Quantity, _value: f64) {}
    }

    fn hardware(adc: i32) -> StationHardware {
        StationHardware {
            adc: Box::new(Fixed(AdcSample::new([adc, 0, 0, 0]))),
            climate: Box::new(Fixed(ClimateSample { temperature: 21.0, humidity: 45.0 })),
            pressure: Box::new(Fixed(PressureSample { pressure: 1013.25, altitude: 0.0 })),
            light: Box::new(Fixed(LightSample { lux: 250.0 })),
        }
    }

    #[test]
    fn registry_releases_group_on_drop() {
        let registry = StationRegistry::new();
        let lease = registry.claim("a").unwrap();
        assert!(registry.is_active("a"));
        assert_eq!(
            registry.claim("a").unwrap_err(),
            StationError::AlreadyActive { group: "a".to_string() }
        );
        assert!(registry.claim("b").is_ok());

        drop(lease);
        assert!(!registry.is_active("a"));
        assert!(registry.claim("a").is_ok());
    }

    #[test]
    fn measure_before_enable_uses_defaults() {
        let registry = StationRegistry::new();
        let mut station =
            Station::setup(&registry, StationConfig::default(), hardware(8000), NullSink)
                .unwrap()
                .with_time_source(FixedTime::new(5_000));

        let measurement = station.measure();
        assert_eq!(measurement.timestamp, 5_000);
        assert_eq!(measurement.value(Quantity::Temperature), Some(0.0));
        // ADC default is zero, so no gas estimate
        assert!(measurement.get(Quantity::Co2).is_none());
        assert_eq!(measurement.readings.len(), 4);
    }

    #[test]
    fn invalid_config_releases_the_group() {
        let registry = StationRegistry::new();
        let mut config = StationConfig::default();
        config.filters.co2 = FilterConfig::moving_average(0);

        let err = Station::setup(&registry, config, hardware(1), NullSink).err().unwrap();
        assert_eq!(err, StationError::Config(ConfigError::Filter(FilterError::ZeroWindow)));
        assert!(registry.is_empty());
    }

    #[test]
    fn enable_disable_cycle() {
        let registry = StationRegistry::new();
        let mut station =
            Station::setup(&registry, StationConfig::default(), hardware(8000), NullSink).unwrap();
        assert!(!station.is_enabled());

        assert!(station.enable());
        assert!(station.is_enabled());
        assert!(station.all_readers_running());

        station.disable();
        assert!(!station.is_enabled());
        assert!(!station.all_readers_running());
    }

    #[test]
    fn dropping_station_frees_group() {
        let registry = StationRegistry::new();
        let mut station =
            Station::setup(&registry, StationConfig::default(), hardware(8000), NullSink).unwrap();
        station.enable();
        assert_eq!(station.group(), "sensor-station");
        drop(station);
        assert!(!registry.is_active("sensor-station"));
    }
}
