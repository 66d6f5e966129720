//! Device port — the boundary to the external device-control client.
//!
//! The engine consumes only a handful of operations from that client:
//! connect, scan start/stop, a vibration command, an all-stop, disconnect,
//! and a stream of device-discovery notifications. Everything else about
//! the device protocol lives behind this trait, in adapter crates.

use std::future::Future;

use tokio::sync::mpsc;

/// Transport-level failure reported by a device-control client.
///
/// Adapters wrap their own error types in this; the session layer treats it
/// as opaque and surfaces the full source chain to the user.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ClientError(Box<dyn std::error::Error + Send + Sync>);

impl ClientError {
    /// Wrap an adapter-specific error.
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(source))
    }
}

/// A device-discovery notification pushed by the device-control server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A new device became available.
    Added {
        /// Server-assigned device index.
        index: u32,
        /// Human-readable device name.
        name: String,
    },
    /// A previously discovered device went away.
    Removed {
        /// Server-assigned device index.
        index: u32,
    },
}

/// A client for a device-control server.
///
/// One connection at a time: `connect` hands back the receiver for device
/// notifications, and every other operation requires the connection it
/// established. Implementations make a **single** connect attempt — no
/// retry, no backoff — and block until the server accepts or refuses.
pub trait DeviceClient: Send {
    /// Connect to the server at `url` and perform the protocol handshake.
    ///
    /// On success, returns the channel on which device added/removed
    /// notifications will arrive for the lifetime of the connection.
    fn connect(
        &mut self,
        url: &str,
    ) -> impl Future<Output = Result<mpsc::Receiver<DeviceEvent>, ClientError>> + Send;

    /// Ask the server to start scanning for devices.
    fn start_scanning(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Ask the server to stop scanning.
    fn stop_scanning(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Drive the vibration actuator of one device.
    ///
    /// `speed` is a normalized level in `[0.0, 1.0]`.
    fn vibrate(
        &mut self,
        device_index: u32,
        speed: f64,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Halt all devices the server knows about.
    fn stop_all_devices(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Tear down the connection. Safe to call when not connected.
    fn disconnect(&mut self) -> impl Future<Output = Result<(), ClientError>> + Send;
}
