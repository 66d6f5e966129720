//! Application-layer error types.

use crate::ports::device::ClientError;

/// Why a device-session operation failed.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A connect was issued while another attempt was in flight.
    #[error("a connection attempt is already in progress")]
    AlreadyConnecting,

    /// A connect was issued while already connected.
    #[error("already connected to a device server")]
    AlreadyConnected,

    /// A send or stop was issued without an established connection.
    #[error("not connected to a device server")]
    NotConnected,

    /// A send was issued before any device had been discovered.
    #[error("no device has been discovered yet")]
    NoDevice,

    /// The underlying device-control transport failed.
    #[error("device server communication failed")]
    Transport(#[from] ClientError),
}

/// A trigger-file read or write failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to access '{path}'")]
pub struct PersistenceError {
    /// The path that could not be read or written.
    pub path: String,
    /// The underlying IO failure.
    #[source]
    pub source: std::io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_session_errors() {
        assert_eq!(
            SessionError::NoDevice.to_string(),
            "no device has been discovered yet"
        );
        assert_eq!(
            SessionError::NotConnected.to_string(),
            "not connected to a device server"
        );
    }

    #[test]
    fn should_expose_io_source_on_persistence_error() {
        let err = PersistenceError {
            path: "triggers.txt".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "failed to access 'triggers.txt'");
        assert!(std::error::Error::source(&err).is_some());
    }
}
