//! Device session — owns the connection lifecycle to the device-control
//! server and the list of discovered devices.

use tokio::sync::mpsc;

use chatbuzz_domain::trigger::Intensity;

use crate::error::SessionError;
use crate::ports::device::{DeviceClient, DeviceEvent};

/// Default device-server port (the Intiface default).
pub const DEFAULT_PORT: u16 = 12345;

/// Build the websocket URL for a `host[:port]` target, appending the
/// default port when none is given.
#[must_use]
pub fn server_url(target: &str) -> String {
    if target.contains(':') {
        format!("ws://{target}/buttplug")
    } else {
        format!("ws://{target}:{DEFAULT_PORT}/buttplug")
    }
}

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// A device discovered through the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    /// Server-assigned index, used to address commands.
    pub index: u32,
    /// Human-readable name, used for user reporting.
    pub name: String,
}

/// Owns a [`DeviceClient`] and tracks connection state plus discovered
/// devices. Commands always target the **first** discovered device.
///
/// All operations run on the single sequential command/event path, so no
/// internal locking is needed.
pub struct DeviceSession<C> {
    client: C,
    state: ConnectionState,
    devices: Vec<DeviceHandle>,
    events: Option<mpsc::Receiver<DeviceEvent>>,
}

impl<C: DeviceClient> DeviceSession<C> {
    /// Create a disconnected session around `client`.
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: ConnectionState::Disconnected,
            devices: Vec::new(),
            events: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the session is connected.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Devices discovered so far, in discovery order.
    #[must_use]
    pub fn devices(&self) -> &[DeviceHandle] {
        &self.devices
    }

    /// Connect to `target` (`host[:port]`) and start device discovery.
    ///
    /// Fails fast when a connection exists or is being attempted. The
    /// connect itself blocks until the server accepts or refuses — no
    /// timeout, a single attempt. On transport failure the session returns
    /// to [`ConnectionState::Disconnected`].
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyConnecting`], [`SessionError::AlreadyConnected`],
    /// or [`SessionError::Transport`].
    pub async fn connect(&mut self, target: &str) -> Result<(), SessionError> {
        match self.state {
            ConnectionState::Connecting => return Err(SessionError::AlreadyConnecting),
            ConnectionState::Connected => return Err(SessionError::AlreadyConnected),
            ConnectionState::Disconnected => {}
        }

        let url = server_url(target);
        self.state = ConnectionState::Connecting;
        tracing::info!(%url, "connecting to device server");

        match self.client.connect(&url).await {
            Ok(events) => {
                self.events = Some(events);
                self.state = ConnectionState::Connected;
            }
            Err(err) => {
                self.state = ConnectionState::Disconnected;
                return Err(err.into());
            }
        }

        // Discovery starts immediately after a successful connect. A scan
        // failure leaves the connection up; the caller decides what to tell
        // the user.
        self.client.start_scanning().await?;
        tracing::info!("scanning for devices");
        Ok(())
    }

    /// Absorb pending device notifications into the device list.
    ///
    /// Returns the names of newly discovered devices, for user reporting.
    pub fn drain_device_events(&mut self) -> Vec<String> {
        let mut added = Vec::new();
        let Some(events) = self.events.as_mut() else {
            return added;
        };
        while let Ok(event) = events.try_recv() {
            match event {
                DeviceEvent::Added { index, name } => {
                    tracing::info!(index, name = %name, "device discovered");
                    added.push(name.clone());
                    self.devices.push(DeviceHandle { index, name });
                }
                DeviceEvent::Removed { index } => {
                    tracing::info!(index, "device removed");
                    self.devices.retain(|device| device.index != index);
                }
            }
        }
        added
    }

    /// Send `intensity` (normalized to `[0.0, 1.0]`) to the first
    /// discovered device.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] without an established connection,
    /// [`SessionError::NoDevice`] when discovery has not produced a device
    /// yet, or [`SessionError::Transport`] on a failed command.
    pub async fn send(&mut self, intensity: Intensity) -> Result<(), SessionError> {
        self.drain_device_events();
        if self.state != ConnectionState::Connected {
            return Err(SessionError::NotConnected);
        }
        let Some(first) = self.devices.first() else {
            return Err(SessionError::NoDevice);
        };
        let index = first.index;
        tracing::debug!(index, intensity = intensity.value(), "sending vibration");
        self.client.vibrate(index, intensity.level()).await?;
        Ok(())
    }

    /// Halt every device the server knows about.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] or [`SessionError::Transport`].
    pub async fn stop_all(&mut self) -> Result<(), SessionError> {
        if self.state != ConnectionState::Connected {
            return Err(SessionError::NotConnected);
        }
        self.client.stop_all_devices().await?;
        Ok(())
    }

    /// Tear down the connection. A no-op when already disconnected.
    ///
    /// The session always ends up [`ConnectionState::Disconnected`] with an
    /// empty device list, even when the transport teardown reports an error.
    ///
    /// # Errors
    ///
    /// [`SessionError::Transport`] when the teardown itself failed.
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        if self.state == ConnectionState::Disconnected {
            return Ok(());
        }
        let result = self.client.disconnect().await;
        self.state = ConnectionState::Disconnected;
        self.devices.clear();
        self.events = None;
        tracing::info!("disconnected from device server");
        result.map_err(Into::into)
    }
}
