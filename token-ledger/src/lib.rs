//! Lumix Token Ledger
//!
//! Capped, pausable fungible-token ledger with an owner-gated admin role,
//! allowance-based delegated transfers and a one-time-per-account faucet.
//!
//! # Architecture
//!
//! - **State machine**: `Ledger` applies operations synchronously and atomically
//! - **Single Writer**: `LedgerActor` owns the ledger; `LedgerHandle` clones
//!   talk to it over a bounded mailbox
//! - **Event Sinks**: every committed mutation emits one event record
//!
//! # Invariants
//!
//! - Supply conservation: Σ(balances) == total_supply ≤ cap
//! - Guard order: pause → authorization → arguments → funds/allowance/cap
//! - All-or-nothing: a rejected operation leaves no trace

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod metrics;
pub mod types;
pub mod units;

// Re-exports
pub use actor::{spawn_ledger_actor, ActorOptions, LedgerHandle};
pub use config::Config;
pub use error::{Error, Result};
pub use events::{BroadcastSink, EventSink, MemorySink, TracingSink};
pub use ledger::{Ledger, LedgerSnapshot, TokenInfo, TokenParams};
pub use metrics::Metrics;
pub use types::{AccountId, Amount, Command, LedgerEvent, Receipt, TokenEvent};
