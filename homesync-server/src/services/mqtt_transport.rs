use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use homesync_core::MessageTransport;
use homesync_core::device::DeviceCommand;
use homesync_core::error::TransportError;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS, TlsConfiguration, Transport};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::configs::{Gateway, GatewayAuth, GatewayTopic};

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Publishes device commands to the MQTT broker.
///
/// Connectivity follows the event loop: a successful `ConnAck` marks the
/// transport connected, any polling error marks it disconnected.
pub struct MqttTransport {
    client: AsyncClient,
    event_loop: Arc<Mutex<EventLoop>>,
    topic: GatewayTopic,
    connected: Arc<AtomicBool>,
}

impl MqttTransport {
    pub fn new(gateway: &Gateway) -> anyhow::Result<Self> {
        let mut options = MqttOptions::new(&gateway.client_id, &gateway.host, gateway.port);
        options.set_keep_alive(Duration::from_secs(gateway.keep_alive_secs));

        match &gateway.auth {
            Some(GatewayAuth::Basic { username, password }) => {
                options.set_credentials(username, password);
            }
            Some(GatewayAuth::Tls { ca_path, cert_path, key_path }) => {
                let ca = fs::read(ca_path)?;
                let client_cert = fs::read(cert_path)?;
                let client_key = fs::read(key_path)?;

                options.set_transport(Transport::Tls(TlsConfiguration::Simple {
                    ca,
                    alpn: None,
                    client_auth: Some((client_cert, client_key)),
                }));
            }
            None => {}
        }

        let (client, event_loop) = AsyncClient::new(options, 10);

        Ok(Self {
            client,
            event_loop: Arc::new(Mutex::new(event_loop)),
            topic: gateway.topic.clone(),
            connected: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Drives the connection. Publishing only makes progress while this runs.
    pub fn start(&self) -> JoinHandle<()> {
        let event_loop = self.event_loop.clone();
        let connected = self.connected.clone();

        tokio::spawn(async move {
            let mut event_loop = event_loop.lock().await;
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        let accepted = ack.code == ConnectReturnCode::Success;
                        connected.store(accepted, Ordering::SeqCst);

                        if accepted {
                            tracing::info!("MQTT broker connected");
                        } else {
                            tracing::warn!("MQTT broker refused connection: {:?}", ack.code);
                        }
                    }
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        connected.store(false, Ordering::SeqCst);
                        tracing::warn!("MQTT broker disconnected");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        if connected.swap(false, Ordering::SeqCst) {
                            tracing::warn!("MQTT connection lost: {}", e);
                        } else {
                            tracing::debug!("MQTT error: {}", e);
                        }

                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        })
    }

    pub fn topic(&self, device_id: &str) -> String {
        self.topic.command(device_id)
    }
}

pub fn encode_command(command: &DeviceCommand) -> Result<Vec<u8>, TransportError> {
    Ok(serde_json::to_vec(command)?)
}

#[async_trait]
impl MessageTransport for MqttTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send(&self, device_id: &str, command: &DeviceCommand) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }

        let payload = encode_command(command)?;
        let topic = self.topic(device_id);

        self.client
            .publish(&topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| TransportError::Publish(e.to_string()))?;

        tracing::debug!("published {} to {}", command.name(), topic);
        Ok(())
    }
}
