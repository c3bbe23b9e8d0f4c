//! Event sinks
//!
//! Sinks observe committed events. Publishing happens after the ledger state
//! has already changed and cannot fail, so a slow or absent observer never
//! affects the outcome of an operation.

use crate::types::{LedgerEvent, TokenEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Observer of committed ledger events
pub trait EventSink: Send + Sync {
    /// Deliver one event record
    fn publish(&self, event: &LedgerEvent);
}

/// Writes each event as a structured `tracing` record
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, record: &LedgerEvent) {
        match &record.event {
            TokenEvent::Mint { to, amount } => {
                tracing::info!(sequence = record.sequence, to = %to, amount = %amount, "Mint");
            }
            TokenEvent::Burn { from, amount } => {
                tracing::info!(sequence = record.sequence, from = %from, amount = %amount, "Burn");
            }
            TokenEvent::Transfer { from, to, amount } => {
                tracing::info!(sequence = record.sequence, from = %from, to = %to, amount = %amount, "Transfer");
            }
            TokenEvent::Approval {
                owner,
                spender,
                amount,
            } => {
                tracing::info!(sequence = record.sequence, owner = %owner, spender = %spender, amount = %amount, "Approval");
            }
            TokenEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => {
                tracing::info!(sequence = record.sequence, previous_owner = %previous_owner, new_owner = %new_owner, "OwnershipTransferred");
            }
            TokenEvent::Paused { account } => {
                tracing::info!(sequence = record.sequence, account = %account, "Paused");
            }
            TokenEvent::Unpaused { account } => {
                tracing::info!(sequence = record.sequence, account = %account, "Unpaused");
            }
        }
    }
}

/// Fans events out to `tokio::sync::broadcast` subscribers
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<LedgerEvent>,
}

impl BroadcastSink {
    /// Create a sink buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// New receiver for events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, event: &LedgerEvent) {
        // No subscribers is not an error
        let _ = self.sender.send(event.clone());
    }
}

/// Collects events in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LedgerEvent>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything published so far
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().clone()
    }

    /// Number of events published so far
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been published
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Remove and return everything published so far
    pub fn drain(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for MemorySink {
    fn publish(&self, event: &LedgerEvent) {
        self.events.lock().push(event.clone());
    }
}
