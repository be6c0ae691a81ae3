//! Command and error-code catalogs shared with the backend.
//!
//! Both enumerations are closed and versioned: the discriminants are the
//! wire values, and renumbering or removing an existing code breaks every
//! backend built against the old catalog. New codes are appended.

use crate::error::{LinkError, Result};

/// Commands the backend accepts, grouped by subsystem.
///
/// The discriminant is the `u32` command code sent on the wire. Each code
/// implies an argument shape that the facade layer must honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Command {
    /// Read a 1-byte memory frame. Args: `u64 address | bool translate`.
    MemoryReadByteFrame = 0,
    /// Read a 4-byte memory frame. Args: `u64 address | bool translate`.
    MemoryReadWordFrame = 1,
    /// Read a 2-byte memory frame. Args: `u64 address | bool translate`.
    MemoryReadDualFrame = 2,
    /// Read an 8-byte memory frame. Args: `u64 address | bool translate`.
    MemoryReadQuadFrame = 3,

    // Code 4 is reserved.
    //
    /// Diagnostic: render one frame of red noise on the backend GPU and
    /// return the pixel buffer. No arguments.
    TestVideoRedNoise = 5,
    /// Diagnostic: resize the red-noise pixel buffer.
    /// Args: `u64 width | u64 height`.
    TestVideoRedNoiseSetDimension = 6,
}

impl Command {
    /// Wire code for this command.
    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Declared size in bytes of one result unit in this command's response,
    /// or `None` when the response length is backend-declared (variable).
    ///
    /// The memory-read granularities are fixed by the catalog; the video
    /// diagnostics return whatever buffer the backend currently holds.
    pub fn result_unit_size(self) -> Option<usize> {
        match self {
            Command::MemoryReadByteFrame => Some(1),
            Command::MemoryReadDualFrame => Some(2),
            Command::MemoryReadWordFrame => Some(4),
            Command::MemoryReadQuadFrame => Some(8),
            Command::TestVideoRedNoise | Command::TestVideoRedNoiseSetDimension => None,
        }
    }
}

impl TryFrom<u32> for Command {
    type Error = LinkError;

    fn try_from(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Command::MemoryReadByteFrame),
            1 => Ok(Command::MemoryReadWordFrame),
            2 => Ok(Command::MemoryReadDualFrame),
            3 => Ok(Command::MemoryReadQuadFrame),
            5 => Ok(Command::TestVideoRedNoise),
            6 => Ok(Command::TestVideoRedNoiseSetDimension),
            other => Err(LinkError::Encoding(format!("unknown command code {other}"))),
        }
    }
}

/// Error codes the backend may signal inside a response payload.
///
/// The wire format for error signaling is a backend concern; the client only
/// exposes the raw payload and lets the caller decide whether it encodes one
/// of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BackendError {
    /// The requested address does not exist in the emulated address space.
    MemoryInvalidAddress = 0,
    /// Address translation hit an unmapped page.
    MemoryPageFault = 1,
}

impl TryFrom<u32> for BackendError {
    type Error = LinkError;

    fn try_from(code: u32) -> Result<Self> {
        match code {
            0 => Ok(BackendError::MemoryInvalidAddress),
            1 => Ok(BackendError::MemoryPageFault),
            other => Err(LinkError::Encoding(format!(
                "unknown backend error code {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_codes_are_stable() {
        assert_eq!(Command::MemoryReadByteFrame.code(), 0);
        assert_eq!(Command::MemoryReadWordFrame.code(), 1);
        assert_eq!(Command::MemoryReadDualFrame.code(), 2);
        assert_eq!(Command::MemoryReadQuadFrame.code(), 3);
        assert_eq!(Command::TestVideoRedNoise.code(), 5);
        assert_eq!(Command::TestVideoRedNoiseSetDimension.code(), 6);
    }

    #[test]
    fn test_command_roundtrip() {
        for command in [
            Command::MemoryReadByteFrame,
            Command::MemoryReadWordFrame,
            Command::MemoryReadDualFrame,
            Command::MemoryReadQuadFrame,
            Command::TestVideoRedNoise,
            Command::TestVideoRedNoiseSetDimension,
        ] {
            assert_eq!(Command::try_from(command.code()).unwrap(), command);
        }
    }

    #[test]
    fn test_unknown_command_code_rejected() {
        assert!(Command::try_from(4).is_err());
        assert!(Command::try_from(7).is_err());
        assert!(Command::try_from(u32::MAX).is_err());
    }

    #[test]
    fn test_memory_read_granularities() {
        assert_eq!(Command::MemoryReadByteFrame.result_unit_size(), Some(1));
        assert_eq!(Command::MemoryReadDualFrame.result_unit_size(), Some(2));
        assert_eq!(Command::MemoryReadWordFrame.result_unit_size(), Some(4));
        assert_eq!(Command::MemoryReadQuadFrame.result_unit_size(), Some(8));
    }

    #[test]
    fn test_video_responses_are_backend_declared() {
        assert_eq!(Command::TestVideoRedNoise.result_unit_size(), None);
        assert_eq!(
            Command::TestVideoRedNoiseSetDimension.result_unit_size(),
            None
        );
    }

    #[test]
    fn test_backend_error_roundtrip() {
        assert_eq!(
            BackendError::try_from(0).unwrap(),
            BackendError::MemoryInvalidAddress
        );
        assert_eq!(
            BackendError::try_from(1).unwrap(),
            BackendError::MemoryPageFault
        );
        assert!(BackendError::try_from(2).is_err());
    }
}
