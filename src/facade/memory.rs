//! Memory-access facade.
//!
//! Every read takes a 64-bit address and a translation flag. The payload
//! layout is the same for all four granularities:
//! `u64 address (BE) | bool translate (1 byte)`.

use bytes::Bytes;

use crate::command::Command;
use crate::connection::Connection;
use crate::error::Result;
use crate::wire::codec::{concat, encode_bool, encode_u64};

/// Typed wrapper for the memory-frame read commands.
pub struct Memory<'a> {
    conn: &'a Connection,
}

impl<'a> Memory<'a> {
    /// Create a facade borrowing `conn`.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Read a 1-byte frame at `address`.
    ///
    /// `translate` asks the backend to run the address through its page
    /// translation first.
    pub async fn read_byte_frame(&self, address: u64, translate: bool) -> Result<Bytes> {
        self.read(Command::MemoryReadByteFrame, address, translate)
            .await
    }

    /// Read a 2-byte frame at `address`.
    pub async fn read_dual_frame(&self, address: u64, translate: bool) -> Result<Bytes> {
        self.read(Command::MemoryReadDualFrame, address, translate)
            .await
    }

    /// Read a 4-byte frame at `address`.
    pub async fn read_word_frame(&self, address: u64, translate: bool) -> Result<Bytes> {
        self.read(Command::MemoryReadWordFrame, address, translate)
            .await
    }

    /// Read an 8-byte frame at `address`.
    pub async fn read_quad_frame(&self, address: u64, translate: bool) -> Result<Bytes> {
        self.read(Command::MemoryReadQuadFrame, address, translate)
            .await
    }

    async fn read(&self, command: Command, address: u64, translate: bool) -> Result<Bytes> {
        self.conn
            .send(command, read_frame_payload(address, translate).into())
            .await
    }
}

/// Build the argument payload for a memory-frame read.
fn read_frame_payload(address: u64, translate: bool) -> Vec<u8> {
    concat(&[&encode_u64(address), &encode_bool(translate)])
}
