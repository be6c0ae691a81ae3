//! Correlation table: in-flight request ids and their waiters.
//!
//! Maps each pending request id to the single oneshot sender whose receiver
//! the caller is awaiting. Owns id allocation: candidates advance
//! monotonically (wrapping), skipping 0 and any id that is still pending,
//! so an id is never reallocated while its response is outstanding and
//! allocation terminates after at most `pending + 1` probes.
//!
//! The table itself is not synchronized; the connection owns it behind a
//! single mutex so that insert-on-send, remove-on-resolve, and
//! drain-on-close are mutually exclusive.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::oneshot;

use crate::error::{LinkError, Result};

/// In-flight request table with deterministic id allocation.
pub struct CorrelationTable {
    /// Pending waiters, one per in-flight request id.
    pending: HashMap<u32, oneshot::Sender<Bytes>>,
    /// Next allocation candidate. Never 0: a zero id stays unused as a
    /// wire-level sentinel.
    next_id: u32,
}

impl CorrelationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a fresh id and register a waiter for it.
    ///
    /// The returned receiver resolves with the response payload once the
    /// matching inbound frame arrives. Dropping the sender (drain on close)
    /// fails the receiver instead.
    pub fn register(&mut self) -> (u32, oneshot::Receiver<Bytes>) {
        let id = self.allocate();
        let (tx, rx) = oneshot::channel();
        let previous = self.pending.insert(id, tx);
        debug_assert!(previous.is_none(), "allocator returned a pending id");
        (id, rx)
    }

    /// Pick the next non-pending candidate, advancing and skipping.
    fn allocate(&mut self) -> u32 {
        loop {
            let candidate = self.next_id;
            self.next_id = match self.next_id.wrapping_add(1) {
                0 => 1,
                next => next,
            };

            if !self.pending.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Resolve the waiter registered for `id` with `payload`, removing it.
    ///
    /// One-shot: each id resolves exactly once. An id with no entry (or
    /// whose caller has already given up, e.g. after a timeout) is a stale
    /// response; the caller logs and drops it.
    pub fn resolve(&mut self, id: u32, payload: Bytes) -> Result<()> {
        let waiter = self
            .pending
            .remove(&id)
            .ok_or(LinkError::StaleResponse(id))?;

        // The receiver may have been dropped between removal from the map
        // and delivery (abandoned call). Same anomaly as an unknown id.
        waiter
            .send(payload)
            .map_err(|_| LinkError::StaleResponse(id))
    }

    /// Remove the entry for `id` without resolving it (timeout, abandon).
    ///
    /// Returns true if an entry was present. A response arriving later for
    /// this id becomes a stale response.
    pub fn abandon(&mut self, id: u32) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Drop every pending waiter. Each awaiting caller observes the closed
    /// channel and maps it to `ConnectionClosed`.
    pub fn drain(&mut self) {
        self.pending.clear();
    }

    /// Number of in-flight requests.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check whether no requests are in flight.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Check whether `id` is currently pending.
    pub fn contains(&self, id: u32) -> bool {
        self.pending.contains_key(&id)
    }

    /// Force the next allocation candidate (for allocator tests).
    #[cfg(test)]
    fn set_next(&mut self, next: u32) {
        self.next_id = next;
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_distinct_ids() {
        let mut table = CorrelationTable::new();
        let mut ids = std::collections::HashSet::new();

        let receivers: Vec<_> = (0..100)
            .map(|_| {
                let (id, rx) = table.register();
                assert!(ids.insert(id), "id {id} allocated twice");
                rx
            })
            .collect();

        assert_eq!(table.len(), 100);
        drop(receivers);
    }

    #[test]
    fn test_never_allocates_zero() {
        let mut table = CorrelationTable::new();
        table.set_next(u32::MAX);

        let (first, _rx1) = table.register();
        let (second, _rx2) = table.register();

        assert_eq!(first, u32::MAX);
        // Wraparound skips 0.
        assert_eq!(second, 1);
    }

    #[test]
    fn test_allocation_skips_pending_id() {
        let mut table = CorrelationTable::new();
        let (first, _rx1) = table.register();
        assert_eq!(first, 1);

        // Rewind the candidate onto the pending id; allocation must skip it.
        table.set_next(1);
        let (second, _rx2) = table.register();
        assert_eq!(second, 2);
    }

    #[test]
    fn test_resolve_delivers_payload_once() {
        let mut table = CorrelationTable::new();
        let (id, mut rx) = table.register();

        table
            .resolve(id, Bytes::from_static(b"payload"))
            .unwrap();

        assert_eq!(rx.try_recv().unwrap(), Bytes::from_static(b"payload"));
        assert!(table.is_empty());

        // Second frame with the same id: stale.
        let err = table.resolve(id, Bytes::from_static(b"dup")).unwrap_err();
        assert!(matches!(err, LinkError::StaleResponse(i) if i == id));
    }

    #[test]
    fn test_resolve_unknown_id_is_stale() {
        let mut table = CorrelationTable::new();
        let err = table.resolve(99, Bytes::new()).unwrap_err();
        assert!(matches!(err, LinkError::StaleResponse(99)));
    }

    #[test]
    fn test_resolve_dropped_receiver_is_stale() {
        let mut table = CorrelationTable::new();
        let (id, rx) = table.register();
        drop(rx);

        let err = table.resolve(id, Bytes::new()).unwrap_err();
        assert!(matches!(err, LinkError::StaleResponse(i) if i == id));
        // The dead entry is gone either way.
        assert!(!table.contains(id));
    }

    #[test]
    fn test_abandon_then_late_response() {
        let mut table = CorrelationTable::new();
        let (id, _rx) = table.register();

        assert!(table.abandon(id));
        assert!(!table.abandon(id));

        let err = table.resolve(id, Bytes::new()).unwrap_err();
        assert!(matches!(err, LinkError::StaleResponse(_)));
    }

    #[test]
    fn test_drain_fails_all_waiters() {
        let mut table = CorrelationTable::new();
        let receivers: Vec<_> = (0..5).map(|_| table.register().1).collect();

        table.drain();
        assert!(table.is_empty());

        for mut rx in receivers {
            assert!(rx.try_recv().is_err());
        }
    }
}
