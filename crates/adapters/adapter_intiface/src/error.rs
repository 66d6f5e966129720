//! Intiface adapter error types.

use chatbuzz_app::ports::device::ClientError;

/// Errors specific to the Intiface websocket adapter.
#[derive(Debug, thiserror::Error)]
pub enum IntifaceError {
    /// The websocket transport failed.
    #[error("websocket error: {0}")]
    Websocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A protocol frame could not be encoded or decoded.
    #[error("malformed protocol frame")]
    Codec(#[source] serde_json::Error),

    /// The server replied to the handshake with something unusable.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The server rejected a request.
    #[error("server rejected the request: {message} (code {code})")]
    Server {
        /// Buttplug error class.
        code: i32,
        /// Server-provided description.
        message: String,
    },

    /// The connection dropped while a request was outstanding.
    #[error("connection to the device server was lost")]
    ConnectionLost,
}

impl From<IntifaceError> for ClientError {
    fn from(err: IntifaceError) -> Self {
        ClientError::new(err)
    }
}
