//! Typed command facades.
//!
//! Each facade exposes one subsystem's commands as ordinary async calls:
//! it encodes typed arguments into payload bytes, hands them to the
//! connection with the matching catalog code, and returns the raw response
//! payload. Decoding the payload stays with [`crate::wire::response`],
//! keyed by the command's declared shape.
//!
//! Facades borrow the connection; they never own it or reach into the
//! correlation table.

mod memory;
mod video;

pub use memory::Memory;
pub use video::Video;
