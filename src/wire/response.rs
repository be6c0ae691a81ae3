//! Response-shape helpers.
//!
//! The connection deliberately delivers raw response bytes; interpreting
//! them belongs here, keyed by the command's declared result shape.
//! Response length is backend-declared (the transport message boundary
//! delimits it); the client never infers it, it only validates.

use crate::command::Command;
use crate::error::{LinkError, Result};

/// Split a response payload into big-endian result units of the size the
/// command declares, widened to `u64`.
///
/// Commands with a backend-declared (variable) response shape cannot be
/// split this way; callers consume their payloads raw.
pub fn read_result_units(payload: &[u8], command: Command) -> Result<Vec<u64>> {
    let unit = command.result_unit_size().ok_or_else(|| {
        LinkError::Encoding(format!(
            "command {command:?} has a backend-declared response shape"
        ))
    })?;

    read_units_sized(payload, unit)
}

/// Split a payload into big-endian units of `unit` bytes, widened to `u64`.
pub fn read_units_sized(payload: &[u8], unit: usize) -> Result<Vec<u64>> {
    if unit == 0 || unit > 8 {
        return Err(LinkError::Encoding(format!(
            "result unit size {unit} is outside 1..=8"
        )));
    }

    if payload.len() % unit != 0 {
        return Err(LinkError::Encoding(format!(
            "payload of {} bytes does not divide into {unit}-byte units",
            payload.len()
        )));
    }

    let mut units = Vec::with_capacity(payload.len() / unit);
    for chunk in payload.chunks_exact(unit) {
        let mut value = 0u64;
        for &byte in chunk {
            value = (value << 8) | u64::from(byte);
        }
        units.push(value);
    }

    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_byte_units() {
        let units =
            read_result_units(&[0x01, 0xFF, 0x00], Command::MemoryReadByteFrame).unwrap();
        assert_eq!(units, vec![0x01, 0xFF, 0x00]);
    }

    #[test]
    fn test_read_word_units_big_endian() {
        let units = read_result_units(
            &[0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 1],
            Command::MemoryReadWordFrame,
        )
        .unwrap();
        assert_eq!(units, vec![0xDEADBEEF, 1]);
    }

    #[test]
    fn test_read_quad_unit() {
        let units = read_result_units(
            &0x0102030405060708u64.to_be_bytes(),
            Command::MemoryReadQuadFrame,
        )
        .unwrap();
        assert_eq!(units, vec![0x0102030405060708]);
    }

    #[test]
    fn test_empty_payload_yields_no_units() {
        let units = read_result_units(&[], Command::MemoryReadDualFrame).unwrap();
        assert!(units.is_empty());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = read_result_units(&[1, 2, 3], Command::MemoryReadWordFrame);
        assert!(matches!(result, Err(LinkError::Encoding(_))));
    }

    #[test]
    fn test_variable_shape_rejected() {
        let result = read_result_units(&[1, 2, 3, 4], Command::TestVideoRedNoise);
        assert!(matches!(result, Err(LinkError::Encoding(_))));
    }

    #[test]
    fn test_bad_unit_size_rejected() {
        assert!(read_units_sized(&[], 0).is_err());
        assert!(read_units_sized(&[0; 9], 9).is_err());
    }
}
