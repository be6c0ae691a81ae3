//! Dedicated writer task for outgoing transport messages.
//!
//! All senders share one mpsc channel into a single task that owns the
//! WebSocket sink, so concurrent `send` calls never contend on the sink
//! itself. A pending counter tracks messages accepted but not yet written.
//!
//! ```text
//! send() caller 1 ─┐
//! send() caller 2 ─┼─► mpsc::Sender<Message> ─► Writer Task ─► Socket
//! send() caller N ─┘
//! ```
//!
//! The task exits after forwarding a close message or when every handle is
//! dropped, closing the sink on the way out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{LinkError, Result};

/// Default channel capacity for the outbound queue.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Configuration for the writer task.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Capacity of the outbound message queue.
    pub channel_capacity: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Handle for queueing messages onto the writer task.
///
/// Cheaply cloneable; shared by the send path and the close path.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Message>,
    pending: Arc<AtomicUsize>,
}

impl WriterHandle {
    /// Queue a message for writing.
    ///
    /// Fails with `ConnectionClosed` once the writer task has exited.
    pub async fn send(&self, message: Message) -> Result<()> {
        self.pending.fetch_add(1, Ordering::AcqRel);

        self.tx.send(message).await.map_err(|_| {
            self.pending.fetch_sub(1, Ordering::Release);
            LinkError::ConnectionClosed
        })
    }

    /// Messages accepted but not yet written to the socket.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

/// Spawn the writer task around a WebSocket sink.
pub fn spawn_writer_task<S>(sink: S, config: WriterConfig) -> (WriterHandle, JoinHandle<Result<()>>)
where
    S: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let pending = Arc::new(AtomicUsize::new(0));

    let handle = WriterHandle {
        tx,
        pending: pending.clone(),
    };

    let task = tokio::spawn(writer_loop(rx, sink, pending));

    (handle, task)
}

/// Main writer loop: forward queued messages to the sink.
async fn writer_loop<S>(
    mut rx: mpsc::Receiver<Message>,
    mut sink: S,
    pending: Arc<AtomicUsize>,
) -> Result<()>
where
    S: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    while let Some(message) = rx.recv().await {
        let is_close = matches!(message, Message::Close(_));
        let result = sink.send(message).await;
        pending.fetch_sub(1, Ordering::Release);

        if let Err(error) = result {
            // The counter covers queued messages too; account for the ones
            // that will never be written.
            rx.close();
            while rx.try_recv().is_ok() {
                pending.fetch_sub(1, Ordering::Release);
            }
            return Err(error.into());
        }

        if is_close {
            break;
        }
    }

    let _ = sink.close().await;
    Ok(())
}
