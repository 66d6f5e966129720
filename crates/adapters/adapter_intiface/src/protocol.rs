//! Buttplug v2 wire messages.
//!
//! A frame is a JSON array of messages; each message is a single-key object
//! keyed by its type name, with PascalCase fields:
//!
//! ```json
//! [{"VibrateCmd": {"Id": 5, "DeviceIndex": 0, "Speeds": [{"Index": 0, "Speed": 0.75}]}}]
//! ```
//!
//! Only the subset of the protocol the engine needs is modeled here; frames
//! carrying other message types are skipped on decode.

use serde::{Deserialize, Serialize};

/// Protocol version spoken in the handshake.
pub const PROTOCOL_VERSION: u32 = 2;

/// Client name announced in the handshake.
pub const CLIENT_NAME: &str = "chatbuzz";

/// Messages sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all_fields = "PascalCase")]
pub enum ClientMessage {
    RequestServerInfo {
        id: u32,
        client_name: String,
        message_version: u32,
    },
    RequestDeviceList {
        id: u32,
    },
    StartScanning {
        id: u32,
    },
    StopScanning {
        id: u32,
    },
    VibrateCmd {
        id: u32,
        device_index: u32,
        speeds: Vec<Speed>,
    },
    StopAllDevices {
        id: u32,
    },
}

/// One actuator speed inside a `VibrateCmd`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Speed {
    /// Actuator index within the device.
    pub index: u32,
    /// Normalized speed in `[0.0, 1.0]`.
    pub speed: f64,
}

/// Messages received from the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all_fields = "PascalCase")]
pub enum ServerMessage {
    Ok {
        id: u32,
    },
    Error {
        id: u32,
        error_message: String,
        error_code: i32,
    },
    ServerInfo {
        id: u32,
        server_name: String,
        message_version: u32,
    },
    DeviceAdded {
        device_index: u32,
        device_name: String,
    },
    DeviceRemoved {
        device_index: u32,
    },
    DeviceList {
        id: u32,
        devices: Vec<DeviceInfo>,
    },
    ScanningFinished {
        id: u32,
    },
}

/// One device entry in a `DeviceList` reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceInfo {
    pub device_index: u32,
    pub device_name: String,
}

/// Encode a frame of outgoing messages.
///
/// # Errors
///
/// Returns the underlying serialization error, which for these types only
/// occurs on non-finite floats.
pub fn encode_frame(messages: &[ClientMessage]) -> serde_json::Result<String> {
    serde_json::to_string(messages)
}

/// Decode a frame, skipping individual messages of unknown type.
///
/// # Errors
///
/// Fails only when the frame itself is not a JSON array.
pub fn decode_frame(text: &str) -> serde_json::Result<Vec<ServerMessage>> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let mut messages = Vec::with_capacity(raw.len());
    for value in raw {
        match serde_json::from_value(value) {
            Ok(message) => messages.push(message),
            Err(err) => tracing::debug!(error = %err, "skipping unrecognized server message"),
        }
    }
    Ok(messages)
}
