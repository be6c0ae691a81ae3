//! # framelink
//!
//! Client transport for a remote emulator backend. Opens one persistent
//! WebSocket, frames typed commands into a compact big-endian binary
//! format, and resolves each call to its eventual out-of-order response
//! through a correlation id carried in every frame.
//!
//! ## Architecture
//!
//! - **Wire layer** ([`wire`]): pure encoding primitives, the two frame
//!   layouts, and response-shape helpers.
//! - **Command catalog** ([`command`]): the closed set of command and
//!   backend error codes shared with the backend.
//! - **Correlation table** ([`correlation`]): in-flight id allocation and
//!   the id -> waiter mapping.
//! - **Connection** ([`connection`]): socket ownership, the
//!   `Connecting -> Open -> Closed` lifecycle, demultiplexing, callbacks.
//! - **Facades** ([`facade`]): per-subsystem typed wrappers returning raw
//!   response bytes.
//!
//! ## Wire format
//!
//! ```text
//! Client -> Backend:  u32 command_code | u32 request_id | bytes payload
//! Backend -> Client:  u32 request_id   | bytes payload
//! ```
//!
//! All integers big-endian. Responses may arrive in any order; the request
//! id alone routes them.
//!
//! ## Example
//!
//! ```ignore
//! use framelink::{Connection, LinkConfig};
//!
//! #[tokio::main]
//! async fn main() -> framelink::Result<()> {
//!     let conn = Connection::open(LinkConfig::default()).await?;
//!
//!     // Many requests can be in flight at once; completion order is the
//!     // backend's choice.
//!     let (a, b) = tokio::join!(
//!         conn.memory().read_byte_frame(0x10, true),
//!         conn.memory().read_quad_frame(0x20, false),
//!     );
//!     println!("{:?} {:?}", a?, b?);
//!
//!     conn.close().await;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod connection;
pub mod correlation;
pub mod error;
pub mod facade;
pub mod wire;

mod writer;

pub use command::{BackendError, Command};
pub use config::LinkConfig;
pub use connection::{Connection, ConnectionBuilder, ConnectionState};
pub use error::{LinkError, Result};
pub use facade::{Memory, Video};
