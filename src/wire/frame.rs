//! Frame assembly and parsing.
//!
//! Implements the two frame layouts of the protocol:
//!
//! ```text
//! Outbound (client -> backend):
//! ┌──────────────┬──────────────┬─────────────┐
//! │ Command code │ Request id   │ Payload     │
//! │ 4 bytes      │ 4 bytes      │ variable    │
//! │ uint32 BE    │ uint32 BE    │             │
//! └──────────────┴──────────────┴─────────────┘
//!
//! Inbound (backend -> client):
//! ┌──────────────┬─────────────┐
//! │ Request id   │ Payload     │
//! │ 4 bytes      │ variable    │
//! │ uint32 BE    │             │
//! └──────────────┴─────────────┘
//! ```
//!
//! Inbound frames carry no command code: the request id alone disambiguates,
//! because the correlation table records which command each id belongs to.
//! Frames carry no length field either; the message-oriented transport
//! delimits them.

use bytes::Bytes;

use super::codec::{decode_u32, encode_u32, U32_SIZE};
use crate::command::Command;
use crate::error::{LinkError, Result};

/// Size of the outbound frame header (command code + request id).
pub const REQUEST_HEADER_SIZE: usize = 2 * U32_SIZE;

/// Size of the inbound frame header (request id only).
pub const RESPONSE_HEADER_SIZE: usize = U32_SIZE;

/// An outbound request frame, ready to be encoded onto the wire.
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    /// Command code from the catalog.
    pub command: Command,
    /// Correlation id for this request.
    pub request_id: u32,
    /// Command-specific argument payload (may be empty).
    pub payload: Bytes,
}

impl OutboundFrame {
    /// Create a new outbound frame.
    pub fn new(command: Command, request_id: u32, payload: Bytes) -> Self {
        Self {
            command,
            request_id,
            payload,
        }
    }

    /// Create an outbound frame with an empty payload.
    pub fn empty(command: Command, request_id: u32) -> Self {
        Self::new(command, request_id, Bytes::new())
    }

    /// Encode the frame as a contiguous byte vector.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(REQUEST_HEADER_SIZE + self.payload.len());
        buf.extend_from_slice(&encode_u32(self.command as u32));
        buf.extend_from_slice(&encode_u32(self.request_id));
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Total encoded size of this frame.
    #[inline]
    pub fn size(&self) -> usize {
        REQUEST_HEADER_SIZE + self.payload.len()
    }
}

/// An inbound response frame, parsed from one transport message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    /// Correlation id echoed by the backend.
    pub request_id: u32,
    /// Response payload: everything after the id field (zero-copy).
    pub payload: Bytes,
}

impl InboundFrame {
    /// Parse one inbound transport message.
    ///
    /// Returns a framing error if the message is too short to contain a
    /// request id. The caller drops such messages without tearing the
    /// connection down.
    pub fn parse(mut message: Bytes) -> Result<Self> {
        if message.len() < RESPONSE_HEADER_SIZE {
            return Err(LinkError::Framing(format!(
                "message of {} bytes is shorter than the {}-byte request id",
                message.len(),
                RESPONSE_HEADER_SIZE
            )));
        }

        let id_bytes = message.split_to(RESPONSE_HEADER_SIZE);
        let request_id = decode_u32(&id_bytes).expect("split guarantees 4 bytes");

        Ok(Self {
            request_id,
            payload: message,
        })
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_frame_layout() {
        let frame = OutboundFrame::new(
            Command::MemoryReadByteFrame,
            0x0A0B0C0D,
            Bytes::from_static(b"args"),
        );
        let bytes = frame.encode();

        assert_eq!(bytes.len(), REQUEST_HEADER_SIZE + 4);
        // Command code 0, big-endian.
        assert_eq!(&bytes[..4], &[0, 0, 0, 0]);
        // Request id, big-endian.
        assert_eq!(&bytes[4..8], &[0x0A, 0x0B, 0x0C, 0x0D]);
        assert_eq!(&bytes[8..], b"args");
    }

    #[test]
    fn test_outbound_empty_payload() {
        let frame = OutboundFrame::empty(Command::TestVideoRedNoise, 7);
        let bytes = frame.encode();

        // Command code 5 followed by the id, nothing else.
        assert_eq!(bytes, [0, 0, 0, 5, 0, 0, 0, 7]);
        assert_eq!(frame.size(), REQUEST_HEADER_SIZE);
    }

    #[test]
    fn test_inbound_parse() {
        let message = Bytes::from_static(&[0, 0, 0, 42, 0xDE, 0xAD, 0xBE, 0xEF]);
        let frame = InboundFrame::parse(message).unwrap();

        assert_eq!(frame.request_id, 42);
        assert_eq!(frame.payload(), &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_inbound_parse_empty_payload() {
        let frame = InboundFrame::parse(Bytes::from_static(&[0, 0, 0, 1])).unwrap();
        assert_eq!(frame.request_id, 1);
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_inbound_parse_too_short() {
        let result = InboundFrame::parse(Bytes::from_static(&[0, 0, 0]));
        assert!(matches!(result, Err(LinkError::Framing(_))));

        let result = InboundFrame::parse(Bytes::new());
        assert!(matches!(result, Err(LinkError::Framing(_))));
    }

    #[test]
    fn test_inbound_payload_zero_copy() {
        let message = Bytes::from_static(&[0, 0, 0, 9, 1, 2, 3]);
        let tail_ptr = message[4..].as_ptr();
        let frame = InboundFrame::parse(message).unwrap();

        assert_eq!(frame.payload.as_ptr(), tail_ptr);
    }
}
