//! Error types for framelink.

use thiserror::Error;

/// Main error type for all transport operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// A payload could not be encoded or decoded (wrong length, bad unit
    /// size). Fails before any I/O; recoverable by fixing the argument.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// An inbound message was too short to contain a request id.
    /// The message is dropped; the connection stays open.
    #[error("framing error: {0}")]
    Framing(String),

    /// An inbound frame carried an id with no registered waiter
    /// (duplicate delivery or a reply to an abandoned request).
    #[error("stale response for request id {0}")]
    StaleResponse(u32),

    /// The connection transitioned to Closed while the request was
    /// outstanding (or before it could be sent).
    #[error("connection closed")]
    ConnectionClosed,

    /// A per-call deadline elapsed with no response.
    #[error("request timed out")]
    Timeout,

    /// The transport handshake failed; the connection never opened.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// I/O error on the underlying socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket protocol error from the transport layer.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Result type alias using LinkError.
pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LinkError::StaleResponse(42);
        assert_eq!(err.to_string(), "stale response for request id 42");

        let err = LinkError::ConnectionClosed;
        assert_eq!(err.to_string(), "connection closed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: LinkError = io.into();
        assert!(matches!(err, LinkError::Io(_)));
    }
}
