//! Transport Connectors for Published Measurements
//!
//! ## Overview
//!
//! The station hands every measurement tick to a [`Sink`]. This crate
//! provides the sink that forwards those values to an external transport,
//! and the transports themselves.
//!
//! ```text
//! Station ──publish_all──> ConnectorSink ──JSON──> Connector (MQTT, ...)
//! ```
//!
//! ## Topic Layout
//!
//! With prefix `airguard/sensor-station`:
//!
//! | Topic                                       | Payload                                                 |
//! |---------------------------------------------|---------------------------------------------------------|
//! | `airguard/sensor-station/temperature`       | `{"quantity":"temperature","value":21.23,"unit":"°C"}`  |
//! | `airguard/sensor-station/light_intensity`   | `{"quantity":"light_intensity","value":250.0,"unit":"lux"}` |
//! | `airguard/sensor-station/connected`         | `true` / `false`                                        |
//!
//! ## Delivery
//!
//! Publishing is best effort. A payload the connector refuses is counted in
//! [`ConnectionStats`] and logged; the station never sees the failure and
//! never waits for the transport.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use airguard_connectors::{ConnectorSink, MqttConfig, MqttConnector};
//!
//! let mqtt = MqttConnector::new(MqttConfig {
//!     host: "broker.local".to_string(),
//!     client_id: "sensor-station-01".to_string(),
//!     ..MqttConfig::default()
//! })?;
//! let sink = ConnectorSink::new(mqtt, "airguard/sensor-station");
//! // Station::setup(&registry, config, hardware, sink)?
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(feature = "mqtt")]
pub mod mqtt;

// Re-export common types
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttConfig, MqttConnector, MqttError, QoS};

use std::fmt::Display;

use airguard_core::{Quantity, Sink};
use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

/// Topic suffix carrying the availability flag
pub const CONNECTED_TOPIC: &str = "connected";

/// Common connector errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("Send failed: {0}")]
    Send(String),

    #[error("Could not encode payload: {0}")]
    Serialization(String),
}

/// Trait for all protocol connectors
pub trait Connector {
    type Error: Display;

    /// Send one payload
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error>;

    /// Check if connected
    fn is_connected(&self) -> bool;
}

/// Connection statistics common to all connectors
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Last error message
    pub last_error: Option<String>,
}

#[derive(Serialize)]
struct QuantityPayload {
    quantity: Quantity,
    value: f64,
    unit: &'static str,
}

/// [`Sink`] publishing JSON payloads through a [`Connector`]
pub struct ConnectorSink<C: Connector> {
    connector: C,
    prefix: String,
    stats: ConnectionStats,
}

impl<C: Connector> ConnectorSink<C> {
    /// Publish below `prefix`; a trailing `/` is ignored
    pub fn new(connector: C, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        while prefix.ends_with('/') {
            prefix.pop();
        }
        Self { connector, prefix, stats: ConnectionStats::default() }
    }

    /// Topic for `suffix`
    pub fn topic(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}/{}", self.prefix, suffix)
        }
    }

    /// Delivery statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Underlying connector
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Give back the connector
    pub fn into_inner(self) -> C {
        self.connector
    }

    fn send_json<T: Serialize>(&mut self, suffix: &str, payload: &T) -> Result<(), ConnectorError> {
        let topic = self.topic(suffix);
        let data = serde_json::to_vec(payload)
            .map_err(|err| ConnectorError::Serialization(err.to_string()))?;

        match self.connector.send(&topic, &data) {
            Ok(()) => {
                self.stats.messages_sent += 1;
                self.stats.bytes_sent += data.len() as u64;
                debug!("Published {} bytes on {}", data.len(), topic);
                Ok(())
            }
            Err(err) => Err(ConnectorError::Send(format!("{}: {}", topic, err))),
        }
    }

    fn record(&mut self, result: Result<(), ConnectorError>) {
        if let Err(err) = result {
            warn!("{}", err);
            self.stats.messages_failed += 1;
            self.stats.last_error = Some(err.to_string());
        }
    }
}

impl<C: Connector + Send> Sink for ConnectorSink<C> {
    fn set_available(&mut self, available: bool) {
        let result = self.send_json(CONNECTED_TOPIC, &available);
        self.record(result);
    }

    fn publish(&mut self, quantity: Quantity, value: f64) {
        let payload = QuantityPayload { quantity, value, unit: quantity.unit() };
        let result = self.send_json(quantity.name(), &payload);
        self.record(result);
    }
}
