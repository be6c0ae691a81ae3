//! Wire layer: encoding primitives, frame layouts, response shapes.
//!
//! Everything here is pure and transport-agnostic. The connection layer
//! moves these frames over the socket; facades build payloads with the
//! codec; callers split response payloads with the response helpers.

pub mod codec;
pub mod frame;
pub mod response;

pub use frame::{InboundFrame, OutboundFrame, REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE};
