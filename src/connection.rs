//! Connection lifecycle and request/response multiplexing.
//!
//! A [`Connection`] owns the persistent WebSocket and the correlation
//! table. Its state machine is `Connecting -> Open -> Closed`, terminal:
//! a closed connection never reopens, construct a new one instead.
//!
//! While open, any number of callers may have requests in flight at once;
//! responses complete out of order and are routed purely by request id.
//!
//! # Example
//!
//! ```ignore
//! use framelink::{Connection, LinkConfig};
//!
//! #[tokio::main]
//! async fn main() -> framelink::Result<()> {
//!     let conn = Connection::builder(LinkConfig::default())
//!         .on_open(|| tracing::info!("backend ready"))
//!         .connect()
//!         .await?;
//!
//!     let frame = conn.memory().read_byte_frame(0x1000, true).await?;
//!     println!("read {} byte(s)", frame.len());
//!
//!     conn.close().await;
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::command::Command;
use crate::config::LinkConfig;
use crate::correlation::CorrelationTable;
use crate::error::{LinkError, Result};
use crate::facade::{Memory, Video};
use crate::wire::{InboundFrame, OutboundFrame};
use crate::writer::{spawn_writer_task, WriterConfig, WriterHandle};

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Transport handshake in progress.
    Connecting = 0,
    /// Handshake complete, ready for sends.
    Open = 1,
    /// Terminal. Explicit teardown or transport failure.
    Closed = 2,
}

type LifecycleCallback = Box<dyn Fn() + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&LinkError) + Send + Sync>;

/// Lifecycle notifications exposed to the surrounding application.
#[derive(Default)]
struct Callbacks {
    /// Fires once the transport is ready for sends.
    on_open: Option<LifecycleCallback>,
    /// Fires exactly once, on the transition to Closed.
    on_close: Option<LifecycleCallback>,
    /// Informational; does not itself transition state.
    on_error: Option<ErrorCallback>,
}

/// Builder for configuring lifecycle callbacks before connecting.
pub struct ConnectionBuilder {
    config: LinkConfig,
    callbacks: Callbacks,
}

impl ConnectionBuilder {
    /// Create a builder for the given endpoint configuration.
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            callbacks: Callbacks::default(),
        }
    }

    /// Register the open notification.
    pub fn on_open<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_open = Some(Box::new(callback));
        self
    }

    /// Register the close notification.
    pub fn on_close<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_close = Some(Box::new(callback));
        self
    }

    /// Register the error notification.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&LinkError) + Send + Sync + 'static,
    {
        self.callbacks.on_error = Some(Box::new(callback));
        self
    }

    /// Perform the transport handshake and start the connection.
    ///
    /// On handshake failure the connection is Closed before it was ever
    /// usable: the error and close notifications fire, then the error is
    /// returned.
    pub async fn connect(self) -> Result<Connection> {
        Connection::connect(self.config, self.callbacks).await
    }
}

/// Shared state between the connection handle and its background tasks.
struct Inner {
    /// In-flight request table. The one lock serializing insert-on-send,
    /// remove-on-resolve, and drain-on-close.
    table: Mutex<CorrelationTable>,
    writer: WriterHandle,
    state: AtomicU8,
    /// Guards the Closed transition so on_close fires exactly once.
    close_started: AtomicBool,
    callbacks: Callbacks,
    config: LinkConfig,
}

impl Inner {
    fn state(&self) -> ConnectionState {
        match self.state.load(Ordering::Acquire) {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Open,
            _ => ConnectionState::Closed,
        }
    }

    fn report_error(&self, error: &LinkError) {
        if let Some(callback) = &self.callbacks.on_error {
            callback(error);
        }
    }

    /// Transition to Closed and drain every pending waiter.
    ///
    /// Safe to call from the close path and the read-loop exit path; only
    /// the first caller performs the transition.
    fn shutdown(&self) {
        if self.close_started.swap(true, Ordering::AcqRel) {
            return;
        }

        self.state.store(ConnectionState::Closed as u8, Ordering::Release);

        // State is Closed before the drain, so a send that wins the table
        // lock first still gets its waiter drained here, and one that loses
        // sees Closed and never registers.
        let drained = {
            let mut table = self.table.lock().expect("correlation table poisoned");
            let drained = table.len();
            table.drain();
            drained
        };

        if drained > 0 {
            tracing::debug!(drained, "failed pending requests on close");
        }

        if let Some(callback) = &self.callbacks.on_close {
            callback();
        }
    }

    /// Demultiplex one inbound transport message.
    fn dispatch(&self, message: Bytes) {
        let frame = match InboundFrame::parse(message) {
            Ok(frame) => frame,
            Err(error) => {
                // Framing errors are per-message: drop and report, the
                // connection stays open.
                tracing::warn!(%error, "dropping malformed inbound message");
                return;
            }
        };

        let result = {
            let mut table = self.table.lock().expect("correlation table poisoned");
            table.resolve(frame.request_id, frame.payload)
        };

        if let Err(error) = result {
            tracing::warn!(%error, "dropping unmatched inbound frame");
        }
    }
}

/// A persistent connection to the emulator backend.
///
/// Owns the transport and the correlation table exclusively; facades borrow
/// the connection and never touch the table directly.
pub struct Connection {
    inner: Arc<Inner>,
    read_task: JoinHandle<()>,
    _writer_task: JoinHandle<Result<()>>,
}

impl Connection {
    /// Start building a connection.
    pub fn builder(config: LinkConfig) -> ConnectionBuilder {
        ConnectionBuilder::new(config)
    }

    /// The connection never opened: notify and hand the error back.
    fn fail_handshake(callbacks: &Callbacks, error: LinkError) -> LinkError {
        tracing::error!(%error, "handshake failed");
        if let Some(callback) = &callbacks.on_error {
            callback(&error);
        }
        if let Some(callback) = &callbacks.on_close {
            callback();
        }
        error
    }

    /// Connect with default callbacks.
    pub async fn open(config: LinkConfig) -> Result<Self> {
        ConnectionBuilder::new(config).connect().await
    }

    async fn connect(config: LinkConfig, callbacks: Callbacks) -> Result<Self> {
        let url = config.url();
        tracing::debug!(%url, "connecting to backend");

        let handshake = tokio::time::timeout(
            config.connect_timeout,
            tokio_tungstenite::connect_async(url.as_str()),
        )
        .await;

        let stream = match handshake {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(error)) => {
                return Err(Self::fail_handshake(&callbacks, LinkError::from(error)));
            }
            Err(_elapsed) => {
                let error = LinkError::Handshake(format!(
                    "no handshake within {:?}",
                    config.connect_timeout
                ));
                return Err(Self::fail_handshake(&callbacks, error));
            }
        };

        let (sink, mut source) = stream.split();
        let (writer, writer_task) = spawn_writer_task(sink, WriterConfig::default());

        let inner = Arc::new(Inner {
            table: Mutex::new(CorrelationTable::new()),
            writer,
            state: AtomicU8::new(ConnectionState::Connecting as u8),
            close_started: AtomicBool::new(false),
            callbacks,
            config,
        });

        inner
            .state
            .store(ConnectionState::Open as u8, Ordering::Release);
        tracing::info!(%url, "connected to backend");
        if let Some(callback) = &inner.callbacks.on_open {
            callback();
        }

        let read_inner = inner.clone();
        let read_task = tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Binary(data)) => read_inner.dispatch(Bytes::from(data)),
                    Ok(Message::Close(_)) => {
                        tracing::debug!("backend closed the connection");
                        break;
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                    Ok(other) => {
                        tracing::warn!(?other, "ignoring non-binary message");
                    }
                    Err(error) => {
                        let error = LinkError::from(error);
                        tracing::error!(%error, "transport failed");
                        read_inner.report_error(&error);
                        break;
                    }
                }
            }
            read_inner.shutdown();
        });

        Ok(Self {
            inner,
            read_task,
            _writer_task: writer_task,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// Check whether the connection is open for sends.
    pub fn is_open(&self) -> bool {
        self.inner.state() == ConnectionState::Open
    }

    /// Endpoint configuration this connection was built with.
    pub fn config(&self) -> &LinkConfig {
        &self.inner.config
    }

    /// Number of requests currently awaiting a response.
    pub fn in_flight(&self) -> usize {
        self.inner
            .table
            .lock()
            .expect("correlation table poisoned")
            .len()
    }

    /// Send a command and await its raw response payload.
    ///
    /// Allocates a correlation id, registers the waiter before the frame
    /// can reach the wire, and completes when the matching inbound frame
    /// arrives, in whatever order the backend answers. Fails with
    /// `ConnectionClosed` if the connection dies first. Honors the
    /// configured per-call deadline if one is set.
    pub async fn send(&self, command: Command, payload: Bytes) -> Result<Bytes> {
        match self.inner.config.request_timeout {
            Some(deadline) => self.send_timeout(command, payload, deadline).await,
            None => {
                let (_id, rx) = self.submit(command, payload).await?;
                rx.await.map_err(|_| LinkError::ConnectionClosed)
            }
        }
    }

    /// Send a command with an explicit per-call deadline.
    ///
    /// On expiry the table entry is removed and the call fails with
    /// `Timeout`; a late response for that id is then logged as stale, never
    /// delivered anywhere.
    pub async fn send_timeout(
        &self,
        command: Command,
        payload: Bytes,
        deadline: Duration,
    ) -> Result<Bytes> {
        let (id, rx) = self.submit(command, payload).await?;

        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(_)) => Err(LinkError::ConnectionClosed),
            Err(_elapsed) => {
                self.inner
                    .table
                    .lock()
                    .expect("correlation table poisoned")
                    .abandon(id);
                Err(LinkError::Timeout)
            }
        }
    }

    /// Register a waiter and write the frame.
    async fn submit(
        &self,
        command: Command,
        payload: Bytes,
    ) -> Result<(u32, oneshot::Receiver<Bytes>)> {
        let (id, rx) = {
            let mut table = self.inner.table.lock().expect("correlation table poisoned");
            // Checked under the table lock: shutdown stores Closed before it
            // drains, so either this send errors here or its waiter is
            // covered by the drain.
            if self.inner.state() != ConnectionState::Open {
                return Err(LinkError::ConnectionClosed);
            }
            table.register()
        };

        let frame = OutboundFrame::new(command, id, payload);
        tracing::debug!(command = ?frame.command, request_id = id, bytes = frame.size(), "sending frame");

        if let Err(error) = self.inner.writer.send(Message::Binary(frame.encode())).await {
            self.inner
                .table
                .lock()
                .expect("correlation table poisoned")
                .abandon(id);
            return Err(error);
        }

        Ok((id, rx))
    }

    /// Close the connection.
    ///
    /// Idempotent and safe in any state: transitions to Closed, fails every
    /// pending waiter with `ConnectionClosed`, and releases the transport.
    pub async fn close(&self) {
        self.inner.shutdown();
        // Nudge the writer task to flush a close frame and exit. Ignored if
        // the transport is already gone.
        let _ = self.inner.writer.send(Message::Close(None)).await;
    }

    /// Memory subsystem facade.
    pub fn memory(&self) -> Memory<'_> {
        Memory::new(self)
    }

    /// Video diagnostics facade.
    pub fn video(&self) -> Video<'_> {
        Video::new(self)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Dropping is a teardown like any other: the Closed transition runs
        // (draining waiters, firing on_close once) before the read task goes.
        self.inner.shutdown();
        self.read_task.abort();
    }
}
