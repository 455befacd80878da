use async_trait::async_trait;

use crate::device::DeviceCommand;
use crate::error::TransportError;

/// Outbound command channel to devices.
///
/// A successful `send` only means the command was accepted for transmission,
/// there is no acknowledgment from the device.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    fn is_connected(&self) -> bool;

    async fn send(&self, device_id: &str, command: &DeviceCommand) -> Result<(), TransportError>;
}
