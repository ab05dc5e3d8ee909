//! MQTT connector for AirGuard
//!
//! Wraps a synchronous `rumqttc` client. The event loop runs on its own
//! thread, tracks the connection state and reconnects after a delay when the
//! broker goes away. Publishing only queues the packet, so it never waits
//! on the network.
//!
//! Dropping the connector disconnects and joins the event thread. If the
//! broker is unreachable at that moment the drop can take up to the client's
//! connection timeout.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use rumqttc::{Client, Connection, Event, LastWill, MqttOptions, Packet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Connector, CONNECTED_TOPIC};

/// Delivery guarantee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QoS {
    /// Fire and forget
    AtMostOnce,
    /// Acknowledged delivery
    AtLeastOnce,
    /// Assured single delivery
    ExactlyOnce,
}

impl From<QoS> for rumqttc::QoS {
    fn from(qos: QoS) -> Self {
        match qos {
            QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
            QoS::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
            QoS::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
        }
    }
}

/// Broker and session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker host name or address
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Client identifier, unique per broker
    pub client_id: String,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,
    /// QoS of published values
    pub qos: QoS,
    /// Publish values as retained messages
    pub retain: bool,
    /// Optional `(username, password)`
    pub credentials: Option<(String, String)>,
    /// Topic prefix whose `connected` topic is set to `false` by the broker
    /// when the session is lost
    pub last_will_prefix: Option<String>,
    /// Pause before reconnecting after a connection error (ms)
    pub reconnect_delay_ms: u64,
    /// Outgoing packets queued before sends are refused
    pub queue_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "airguard".to_string(),
            keep_alive_secs: 60,
            qos: QoS::AtLeastOnce,
            retain: true,
            credentials: None,
            last_will_prefix: None,
            reconnect_delay_ms: 1000,
            queue_capacity: 64,
        }
    }
}

impl MqttConfig {
    fn validate(&self) -> Result<(), MqttError> {
        if self.host.is_empty() {
            return Err(MqttError::InvalidConfig("host is empty"));
        }
        if self.client_id.is_empty() {
            return Err(MqttError::InvalidConfig("client_id is empty"));
        }
        if self.keep_alive_secs < 5 {
            return Err(MqttError::InvalidConfig("keep_alive_secs must be at least 5"));
        }
        if self.queue_capacity == 0 {
            return Err(MqttError::InvalidConfig("queue_capacity must be positive"));
        }
        Ok(())
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(self.client_id.clone(), self.host.clone(), self.port);
        options.set_keep_alive(Duration::from_secs(self.keep_alive_secs));
        if let Some((username, password)) = &self.credentials {
            options.set_credentials(username.clone(), password.clone());
        }
        if let Some(prefix) = &self.last_will_prefix {
            let topic = format!("{}/{}", prefix.trim_end_matches('/'), CONNECTED_TOPIC);
            options.set_last_will(LastWill::new(topic, "false", self.qos.into(), true));
        }
        options
    }
}

/// MQTT connector errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MqttError {
    #[error("Invalid MQTT configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("MQTT client error: {0}")]
    Client(String),

    #[error("Could not spawn MQTT event thread")]
    Spawn,
}

/// MQTT connector backed by `rumqttc`
pub struct MqttConnector {
    client: Option<Client>,
    qos: rumqttc::QoS,
    retain: bool,
    connected: Arc<AtomicBool>,
    reconnections: Arc<AtomicU32>,
    stop: Option<Sender<()>>,
    events: Option<JoinHandle<()>>,
}

impl MqttConnector {
    /// Create the client and start its event loop
    pub fn new(config: MqttConfig) -> Result<Self, MqttError> {
        config.validate()?;

        let (client, connection) = Client::new(config.options(), config.queue_capacity);
        let connected = Arc::new(AtomicBool::new(false));
        let reconnections = Arc::new(AtomicU32::new(0));
        let (stop, stop_rx) = mpsc::channel();

        let state = EventState {
            connected: Arc::clone(&connected),
            reconnections: Arc::clone(&reconnections),
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            broker: format!("{}:{}", config.host, config.port),
        };
        let events = thread::Builder::new()
            .name("airguard-mqtt".to_string())
            .spawn(move || state.run(connection, stop_rx))
            .map_err(|_| MqttError::Spawn)?;

        info!("MQTT connector for {}:{} started", config.host, config.port);
        Ok(Self {
            client: Some(client),
            qos: config.qos.into(),
            retain: config.retain,
            connected,
            reconnections,
            stop: Some(stop),
            events: Some(events),
        })
    }

    /// Sessions re-established after the first one
    pub fn reconnections(&self) -> u32 {
        self.reconnections.load(Ordering::SeqCst)
    }
}

impl Connector for MqttConnector {
    type Error = MqttError;

    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| MqttError::Client("client closed".to_string()))?;
        client
            .try_publish(topic, self.qos, self.retain, data.to_vec())
            .map_err(|err| MqttError::Client(err.to_string()))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Drop for MqttConnector {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(err) = client.try_disconnect() {
                debug!("MQTT disconnect not queued: {}", err);
            }
        }
        self.stop.take();
        if let Some(events) = self.events.take() {
            if events.join().is_err() {
                warn!("MQTT event thread panicked");
            }
        }
        self.connected.store(false, Ordering::SeqCst);
    }
}

struct EventState {
    connected: Arc<AtomicBool>,
    reconnections: Arc<AtomicU32>,
    reconnect_delay: Duration,
    broker: String,
}

impl EventState {
    fn run(self, mut connection: Connection, stop: Receiver<()>) {
        let mut sessions = 0u32;

        for event in connection.iter() {
            if matches!(stop.try_recv(), Err(TryRecvError::Disconnected) | Ok(())) {
                break;
            }

            match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    if sessions > 0 {
                        self.reconnections.fetch_add(1, Ordering::SeqCst);
                    }
                    sessions += 1;
                    self.connected.store(true, Ordering::SeqCst);
                    info!("Connected to MQTT broker {}", self.broker);
                }
                Ok(_) => {}
                Err(err) => {
                    if self.connected.swap(false, Ordering::SeqCst) {
                        warn!("Lost MQTT broker {}: {}", self.broker, err);
                    } else {
                        debug!("MQTT broker {} unavailable: {}", self.broker, err);
                    }
                    match stop.recv_timeout(self.reconnect_delay) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            }
        }

        self.connected.store(false, Ordering::SeqCst);
        debug!("MQTT event loop for {} finished", self.broker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MqttConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 1883);
        assert_eq!(rumqttc::QoS::from(config.qos), rumqttc::QoS::AtLeastOnce);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = MqttConfig { client_id: String::new(), ..MqttConfig::default() };
        assert_eq!(
            MqttConnector::new(config).err(),
            Some(MqttError::InvalidConfig("client_id is empty"))
        );

        let config = MqttConfig { keep_alive_secs: 1, ..MqttConfig::default() };
        assert!(matches!(MqttConnector::new(config), Err(MqttError::InvalidConfig(_))));
    }

    #[test]
    fn config_from_json() {
        let config: MqttConfig = serde_json::from_str(
            r#"{ "host": "broker.local", "qos": "at_most_once", "last_will_prefix": "airguard/station" }"#,
        )
        .unwrap();
        assert_eq!(config.host, "broker.local");
        assert_eq!(config.qos, QoS::AtMostOnce);
        assert_eq!(config.client_id, "airguard");
    }

    #[test]
    fn unreachable_broker_queues_and_shuts_down() {
        let config = MqttConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            reconnect_delay_ms: 10,
            ..MqttConfig::default()
        };
        let mut connector = MqttConnector::new(config).unwrap();
        assert!(!connector.is_connected());

        // Queued for when the broker shows up
        assert!(connector.send("station/temperature", b"21.5").is_ok());
        assert_eq!(connector.reconnections(), 0);
        drop(connector);
    }
}
