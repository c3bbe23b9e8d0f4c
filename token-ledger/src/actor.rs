//! Actor-based concurrency for the ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One task owns the `Ledger`; every operation is applied in mailbox order
//! - Reads travel through the same mailbox, so they never see a half-applied
//!   mutation
//! - Committed events are published to sinks after each mutation
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │        Callers (tasks, request handlers, tests)       │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (Single Task)                │
//! │   Ledger::execute() → Receipt → EventSink::publish()  │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::events::{BroadcastSink, EventSink};
use crate::ledger::{Ledger, LedgerSnapshot, TokenInfo};
use crate::metrics::Metrics;
use crate::types::{AccountId, Amount, Command, LedgerEvent, Receipt};
use crate::{Config, Error, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Message sent to the ledger actor
#[derive(Debug)]
pub enum LedgerMessage {
    /// Apply a mutating command
    Execute {
        caller: AccountId,
        command: Command,
        response: oneshot::Sender<Result<Receipt>>,
    },

    /// Read a balance
    BalanceOf {
        account: AccountId,
        response: oneshot::Sender<Amount>,
    },

    /// Read an allowance
    Allowance {
        owner: AccountId,
        spender: AccountId,
        response: oneshot::Sender<Amount>,
    },

    /// Read faucet claim status
    HasClaimedFaucet {
        account: AccountId,
        response: oneshot::Sender<bool>,
    },

    /// Read scalar token info
    Info {
        response: oneshot::Sender<TokenInfo>,
    },

    /// Copy the whole state
    Snapshot {
        response: oneshot::Sender<LedgerSnapshot>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Settings for a spawned actor
#[derive(Clone, Default)]
pub struct ActorOptions {
    /// Mailbox capacity; 0 falls back to 1000
    pub mailbox_capacity: usize,

    /// Per-subscriber broadcast buffer; 0 falls back to 1024
    pub event_buffer: usize,

    /// Extra sinks, called in order after each commit
    pub sinks: Vec<Arc<dyn EventSink>>,

    /// Metrics collector
    pub metrics: Option<Metrics>,
}

impl fmt::Debug for ActorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorOptions")
            .field("mailbox_capacity", &self.mailbox_capacity)
            .field("event_buffer", &self.event_buffer)
            .field("sinks", &self.sinks.len())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl ActorOptions {
    /// Options taken from the service configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            mailbox_capacity: config.mailbox_capacity,
            event_buffer: config.event_buffer,
            ..Self::default()
        }
    }

    /// Add a sink
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Attach metrics
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

/// Actor that owns the ledger and processes messages one at a time
pub struct LedgerActor {
    /// The ledger state
    ledger: Ledger,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,

    /// Sinks notified after each commit
    sinks: Vec<Arc<dyn EventSink>>,

    /// Metrics collector
    metrics: Option<Metrics>,
}

impl fmt::Debug for LedgerActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerActor")
            .field("sequence", &self.ledger.sequence())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl LedgerActor {
    /// Create new actor
    pub fn new(
        ledger: Ledger,
        mailbox: mpsc::Receiver<LedgerMessage>,
        sinks: Vec<Arc<dyn EventSink>>,
        metrics: Option<Metrics>,
    ) -> Self {
        Self {
            ledger,
            mailbox,
            sinks,
            metrics,
        }
    }

    /// Run the actor event loop; returns the final ledger state
    pub async fn run(mut self) -> Ledger {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown => break,
                msg => self.handle_message(msg),
            }
        }

        tracing::info!(sequence = self.ledger.sequence(), "Ledger actor stopped");
        self.ledger
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::Execute {
                caller,
                command,
                response,
            } => {
                let result = self.apply(&caller, command);
                if response.send(result).is_err() {
                    tracing::debug!("Caller dropped before receiving receipt");
                }
            }

            LedgerMessage::BalanceOf { account, response } => {
                let _ = response.send(self.ledger.balance_of(&account));
            }

            LedgerMessage::Allowance {
                owner,
                spender,
                response,
            } => {
                let _ = response.send(self.ledger.allowance(&owner, &spender));
            }

            LedgerMessage::HasClaimedFaucet { account, response } => {
                let _ = response.send(self.ledger.has_claimed_faucet(&account));
            }

            LedgerMessage::Info { response } => {
                let _ = response.send(self.ledger.info());
            }

            LedgerMessage::Snapshot { response } => {
                let _ = response.send(self.ledger.snapshot());
            }

            LedgerMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }

    /// Apply a command and publish its events
    fn apply(&mut self, caller: &AccountId, command: Command) -> Result<Receipt> {
        let operation = command.name();
        let started = Instant::now();
        let result = self.ledger.execute(caller, command);
        let elapsed = started.elapsed().as_secs_f64();

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "ok",
                Err(e) => e.kind(),
            };
            metrics.record_operation(operation, outcome, elapsed);
        }

        if let Ok(receipt) = &result {
            self.publish(&receipt.events);
        }

        result
    }

    fn publish(&self, events: &[LedgerEvent]) {
        for event in events {
            for sink in &self.sinks {
                sink.publish(event);
            }
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_events(events.len());
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
    events: BroadcastSink,
}

impl fmt::Debug for LedgerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerHandle")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>, events: BroadcastSink) -> Self {
        Self { sender, events }
    }

    /// Build the ledger described by `config` and spawn its actor
    pub fn open(config: &Config, options: ActorOptions) -> Result<Self> {
        let ledger = Ledger::new(config.token.deployer()?, config.token.params())?;
        Ok(spawn_ledger_actor(ledger, options))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> LedgerMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Apply a command on behalf of `caller`
    pub async fn execute(&self, caller: &AccountId, command: Command) -> Result<Receipt> {
        self.request(|response| LedgerMessage::Execute {
            caller: caller.clone(),
            command,
            response,
        })
        .await?
    }

    /// Pause the ledger
    pub async fn pause(&self, caller: &AccountId) -> Result<Receipt> {
        self.execute(caller, Command::Pause).await
    }

    /// Unpause the ledger
    pub async fn unpause(&self, caller: &AccountId) -> Result<Receipt> {
        self.execute(caller, Command::Unpause).await
    }

    /// Hand over the admin role
    pub async fn transfer_ownership(&self, caller: &AccountId, new_owner: AccountId) -> Result<Receipt> {
        self.execute(caller, Command::TransferOwnership { new_owner }).await
    }

    /// Mint to the owner
    pub async fn mint(&self, caller: &AccountId, amount: Amount) -> Result<Receipt> {
        self.execute(caller, Command::Mint { amount }).await
    }

    /// Burn from the caller
    pub async fn burn(&self, caller: &AccountId, amount: Amount) -> Result<Receipt> {
        self.execute(caller, Command::Burn { amount }).await
    }

    /// Transfer from the caller
    pub async fn transfer(&self, caller: &AccountId, to: AccountId, amount: Amount) -> Result<Receipt> {
        self.execute(caller, Command::Transfer { to, amount }).await
    }

    /// Set an allowance
    pub async fn approve(&self, caller: &AccountId, spender: AccountId, amount: Amount) -> Result<Receipt> {
        self.execute(caller, Command::Approve { spender, amount }).await
    }

    /// Raise an allowance
    pub async fn increase_allowance(
        &self,
        caller: &AccountId,
        spender: AccountId,
        delta: Amount,
    ) -> Result<Receipt> {
        self.execute(caller, Command::IncreaseAllowance { spender, delta })
            .await
    }

    /// Lower an allowance
    pub async fn decrease_allowance(
        &self,
        caller: &AccountId,
        spender: AccountId,
        delta: Amount,
    ) -> Result<Receipt> {
        self.execute(caller, Command::DecreaseAllowance { spender, delta })
            .await
    }

    /// Delegated transfer
    pub async fn transfer_from(
        &self,
        caller: &AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<Receipt> {
        self.execute(caller, Command::TransferFrom { from, to, amount })
            .await
    }

    /// Claim the faucet
    pub async fn claim_faucet(&self, caller: &AccountId) -> Result<Receipt> {
        self.execute(caller, Command::ClaimFaucet).await
    }

    /// Get a balance
    pub async fn balance_of(&self, account: &AccountId) -> Result<Amount> {
        self.request(|response| LedgerMessage::BalanceOf {
            account: account.clone(),
            response,
        })
        .await
    }

    /// Get an allowance
    pub async fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Result<Amount> {
        self.request(|response| LedgerMessage::Allowance {
            owner: owner.clone(),
            spender: spender.clone(),
            response,
        })
        .await
    }

    /// Whether `account` claimed the faucet
    pub async fn has_claimed_faucet(&self, account: &AccountId) -> Result<bool> {
        self.request(|response| LedgerMessage::HasClaimedFaucet {
            account: account.clone(),
            response,
        })
        .await
    }

    /// Get scalar token info
    pub async fn info(&self) -> Result<TokenInfo> {
        self.request(|response| LedgerMessage::Info { response }).await
    }

    /// Get a consistent copy of the whole state
    pub async fn snapshot(&self) -> Result<LedgerSnapshot> {
        self.request(|response| LedgerMessage::Snapshot { response })
            .await
    }

    /// Receive every event committed after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(LedgerMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(ledger: Ledger, options: ActorOptions) -> LedgerHandle {
    let capacity = if options.mailbox_capacity == 0 {
        1000
    } else {
        options.mailbox_capacity
    };
    let buffer = if options.event_buffer == 0 {
        1024
    } else {
        options.event_buffer
    };

    let broadcast = BroadcastSink::new(buffer);
    let mut sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(broadcast.clone())];
    sinks.extend(options.sinks);

    let (tx, rx) = mpsc::channel(capacity); // Bounded channel for backpressure
    let actor = LedgerActor::new(ledger, rx, sinks, options.metrics);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx, broadcast)
}
