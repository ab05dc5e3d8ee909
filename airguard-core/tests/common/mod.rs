//! Shared fixtures for the integration tests
//!
//! - Scripted transducers whose "physical" value the test sets directly
//! - A recording sink
//! - A rig bundling the four station transducers with their handles
//! - Polling helpers with a bounded wait

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use airguard_core::constants::sensors::{
    ADC_ADDRESS, CLIMATE_ADDRESS, LIGHT_ADDRESS, PRESSURE_ADDRESS,
};
use airguard_core::sensors::{AdcSample, ClimateSample, LightSample, PressureSample};
use airguard_core::{Measurement, Quantity, Sink, StationHardware, Transducer, TransducerError};

/// Upper bound for every polling wait
pub const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// Test-side view of a scripted device
pub struct ScriptState<S> {
    value: Mutex<S>,
    present: AtomicBool,
    probes: AtomicUsize,
    reads: AtomicUsize,
    select_failures: AtomicUsize,
    closed: AtomicBool,
}

impl<S: Copy> ScriptState<S> {
    /// Change what the device reports from its next read on
    pub fn set(&self, value: S) {
        *self.value.lock().unwrap() = value;
    }

    /// Make the next probe fail or succeed
    pub fn set_present(&self, present: bool) {
        self.present.store(present, Ordering::SeqCst);
    }

    /// Fail the next `count` bus selections
    pub fn fail_selects(&self, count: usize) {
        self.select_failures.store(count, Ordering::SeqCst);
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Device reporting whatever the test last set
pub struct ScriptedTransducer<S> {
    name: &'static str,
    address: u8,
    state: Arc<ScriptState<S>>,
}

/// Build a scripted device and the handle that controls it
pub fn scripted<S: Copy>(
    name: &'static str,
    address: u8,
    initial: S,
) -> (ScriptedTransducer<S>, Arc<ScriptState<S>>) {
    let state = Arc::new(ScriptState {
        value: Mutex::new(initial),
        present: AtomicBool::new(true),
        probes: AtomicUsize::new(0),
        reads: AtomicUsize::new(0),
        select_failures: AtomicUsize::new(0),
        closed: AtomicBool::new(false),
    });
    (ScriptedTransducer { name, address, state: Arc::clone(&state) }, state)
}

impl<S: Copy + Default + Send + 'static> Transducer for ScriptedTransducer<S> {
    type Sample = S;

    fn name(&self) -> &'static str {
        self.name
    }

    fn address(&self) -> u8 {
        self.address
    }

    fn probe(&mut self) -> bool {
        self.state.probes.fetch_add(1, Ordering::SeqCst);
        self.state.present.load(Ordering::SeqCst)
    }

    fn select(&mut self) -> Result<(), TransducerError> {
        let failures = &self.state.select_failures;
        if failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(TransducerError::BusAddressing { address: self.address });
        }
        Ok(())
    }

    fn read_raw(&mut self) -> Result<S, TransducerError> {
        // Counted before reading so a count seen by the test implies the value
        self.state.reads.fetch_add(1, Ordering::SeqCst);
        Ok(*self.state.value.lock().unwrap())
    }

    fn sample_interval(&self) -> Duration {
        Duration::from_millis(1)
    }

    fn backoff_interval(&self) -> Duration {
        Duration::from_millis(1)
    }

    fn close(&mut self) {
        self.state.closed.store(true, Ordering::SeqCst);
    }
}

/// Handles to the four devices of a station
pub struct Rig {
    pub adc: Arc<ScriptState<AdcSample>>,
    pub climate: Arc<ScriptState<ClimateSample>>,
    pub pressure: Arc<ScriptState<PressureSample>>,
    pub light: Arc<ScriptState<LightSample>>,
}

impl Rig {
    /// Station hardware reporting typical indoor values
    pub fn new() -> (StationHardware, Rig) {
        let (adc, adc_state) =
            scripted("ADS1115", ADC_ADDRESS, AdcSample::new([8000, 0, 0, 0]));
        let (climate, climate_state) = scripted(
            "SHT30",
            CLIMATE_ADDRESS,
            ClimateSample { temperature: 21.234, humidity: 45.678 },
        );
        let (pressure, pressure_state) = scripted(
            "BMP180",
            PRESSURE_ADDRESS,
            PressureSample { pressure: 1013.456, altitude: 0.0 },
        );
        let (light, light_state) = scripted("TSL2561", LIGHT_ADDRESS, LightSample { lux: 250.0 });

        let hardware = StationHardware {
            adc: Box::new(adc),
            climate: Box::new(climate),
            pressure: Box::new(pressure),
            light: Box::new(light),
        };
        let rig = Rig {
            adc: adc_state,
            climate: climate_state,
            pressure: pressure_state,
            light: light_state,
        };
        (hardware, rig)
    }

    fn reads(&self) -> [usize; 4] {
        [self.adc.reads(), self.climate.reads(), self.pressure.reads(), self.light.reads()]
    }

    /// Wait until every reader has cached a sample read after this call
    pub fn settle(&self) {
        let start = self.reads();
        assert!(
            wait_until(|| self.reads().iter().zip(start.iter()).all(|(now, then)| *now >= then + 2)),
            "readers did not sample"
        );
    }

    pub fn total_probes(&self) -> usize {
        self.adc.probes() + self.climate.probes() + self.pressure.probes() + self.light.probes()
    }
}

/// What a [`RecordingSink`] received
#[derive(Debug, Default)]
pub struct Recorded {
    pub batches: Vec<Vec<(Quantity, f64)>>,
    pub availability: Vec<bool>,
}

/// Sink that keeps every update; clones share the record
#[derive(Clone, Default)]
pub struct RecordingSink {
    record: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    pub fn batches(&self) -> Vec<Vec<(Quantity, f64)>> {
        self.record.lock().unwrap().batches.clone()
    }

    pub fn availability(&self) -> Vec<bool> {
        self.record.lock().unwrap().availability.clone()
    }

    pub fn last_value(&self, quantity: Quantity) -> Option<f64> {
        let record = self.record.lock().unwrap();
        record
            .batches
            .last()
            .and_then(|batch| batch.iter().find(|(q, _)| *q == quantity))
            .map(|(_, value)| *value)
    }
}

impl Sink for RecordingSink {
    fn set_available(&mut self, available: bool) {
        self.record.lock().unwrap().availability.push(available);
    }

    fn publish(&mut self, quantity: Quantity, value: f64) {
        self.record.lock().unwrap().batches.push(vec![(quantity, value)]);
    }

    fn publish_all(&mut self, measurement: &Measurement) {
        self.record.lock().unwrap().batches.push(measurement.published().collect());
    }
}

/// Poll `cond` until it holds or [`WAIT_LIMIT`] passes
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < WAIT_LIMIT {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}
