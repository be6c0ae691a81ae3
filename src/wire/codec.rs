//! Pure encoding primitives for command arguments.
//!
//! Every value on the wire is big-endian. The functions here are stateless
//! and total for well-typed input: the argument types make out-of-range
//! values unrepresentable, so none of the encoders has a failure path.
//! Decoders can fail, because inbound bytes are untrusted.
//!
//! # Example
//!
//! ```
//! use framelink::wire::codec::{encode_u32, decode_u32};
//!
//! let bytes = encode_u32(0xDEADBEEF);
//! assert_eq!(bytes, [0xDE, 0xAD, 0xBE, 0xEF]);
//! assert_eq!(decode_u32(&bytes).unwrap(), 0xDEADBEEF);
//! ```

use crate::error::{LinkError, Result};

/// Size of an encoded u32 in bytes.
pub const U32_SIZE: usize = 4;

/// Size of an encoded u64 in bytes.
pub const U64_SIZE: usize = 8;

/// Size of an encoded bool in bytes.
pub const BOOL_SIZE: usize = 1;

/// Encode a 32-bit unsigned integer as 4 big-endian bytes.
#[inline]
pub fn encode_u32(value: u32) -> [u8; U32_SIZE] {
    value.to_be_bytes()
}

/// Encode a 64-bit value from two 32-bit halves, high half first.
///
/// The result is 8 bytes, big-endian overall: the first 4 bytes equal
/// `encode_u32(hi)` and the last 4 equal `encode_u32(lo)`.
pub fn encode_u64_from_halves(hi: u32, lo: u32) -> [u8; U64_SIZE] {
    let mut buf = [0u8; U64_SIZE];
    buf[..U32_SIZE].copy_from_slice(&encode_u32(hi));
    buf[U32_SIZE..].copy_from_slice(&encode_u32(lo));
    buf
}

/// Encode a 64-bit unsigned integer as 8 big-endian bytes.
///
/// Equivalent to splitting into halves and concatenating them.
#[inline]
pub fn encode_u64(value: u64) -> [u8; U64_SIZE] {
    encode_u64_from_halves((value >> 32) as u32, value as u32)
}

/// Encode a boolean as a single byte: `0x01` for true, `0x00` for false.
#[inline]
pub fn encode_bool(value: bool) -> [u8; BOOL_SIZE] {
    [u8::from(value)]
}

/// Concatenate an ordered list of byte sequences into one payload.
///
/// Order is preserved, total length is the sum of the parts. No padding,
/// no alignment.
pub fn concat(sequences: &[&[u8]]) -> Vec<u8> {
    let total: usize = sequences.iter().map(|s| s.len()).sum();
    let mut buf = Vec::with_capacity(total);
    for seq in sequences {
        buf.extend_from_slice(seq);
    }
    buf
}

/// Decode a 32-bit unsigned integer from the first 4 bytes of `buf`.
pub fn decode_u32(buf: &[u8]) -> Result<u32> {
    let bytes: [u8; U32_SIZE] = buf
        .get(..U32_SIZE)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            LinkError::Encoding(format!("need {} bytes for u32, got {}", U32_SIZE, buf.len()))
        })?;
    Ok(u32::from_be_bytes(bytes))
}

/// Decode a 64-bit unsigned integer from the first 8 bytes of `buf`.
pub fn decode_u64(buf: &[u8]) -> Result<u64> {
    let bytes: [u8; U64_SIZE] = buf
        .get(..U64_SIZE)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            LinkError::Encoding(format!("need {} bytes for u64, got {}", U64_SIZE, buf.len()))
        })?;
    Ok(u64::from_be_bytes(bytes))
}

/// Decode a boolean from the first byte of `buf`. Any nonzero byte is true.
pub fn decode_bool(buf: &[u8]) -> Result<bool> {
    buf.first()
        .map(|&b| b != 0)
        .ok_or_else(|| LinkError::Encoding("need 1 byte for bool, got 0".to_string()))
}
