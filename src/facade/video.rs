//! Video diagnostics facade.
//!
//! Wraps the test commands the backend uses to exercise its render path:
//! a red-noise frame generator and its buffer-dimension control.

use bytes::Bytes;

use crate::command::Command;
use crate::connection::Connection;
use crate::error::Result;
use crate::wire::codec::{concat, encode_u64};

/// Typed wrapper for the video test commands.
pub struct Video<'a> {
    conn: &'a Connection,
}

impl<'a> Video<'a> {
    /// Create a facade borrowing `conn`.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Ask the backend for one frame of red noise.
    ///
    /// The response is the backend's current pixel buffer, RGBA bytes whose
    /// length the backend declares (width * height * 4 for the dimensions
    /// last set).
    pub async fn red_noise(&self) -> Result<Bytes> {
        self.conn.send(Command::TestVideoRedNoise, Bytes::new()).await
    }

    /// Resize the backend's red-noise pixel buffer.
    pub async fn set_dimension(&self, width: u64, height: u64) -> Result<Bytes> {
        let payload = concat(&[&encode_u64(width), &encode_u64(height)]);
        self.conn
            .send(Command::TestVideoRedNoiseSetDimension, payload.into())
            .await
    }
}
