//! Core types for the ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode, ordered maps)
//! - Exact arithmetic (base-unit integers, no floating point)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Amount in base units (already scaled by `10^decimals`)
pub type Amount = u128;

/// Maximum length of an account identifier in bytes
pub const MAX_ACCOUNT_ID_LEN: usize = 128;

/// Null identity; never a valid recipient, spender or owner
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Account identifier (opaque address)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID without validation
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse and validate an account ID
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let account = Self(id.into());
        account.validate()?;
        Ok(account)
    }

    /// Check that the identifier is well-formed and not the null identity
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::InvalidArgument("account id is empty".to_string()));
        }
        if self.0.len() > MAX_ACCOUNT_ID_LEN {
            return Err(Error::InvalidArgument(format!(
                "account id longer than {} bytes",
                MAX_ACCOUNT_ID_LEN
            )));
        }
        if self.0.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::InvalidArgument(format!(
                "account id {:?} contains whitespace or control characters",
                self.0
            )));
        }
        if self.is_zero() {
            return Err(Error::InvalidArgument(
                "zero address is not a valid account".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether this is the null identity (case-insensitive)
    pub fn is_zero(&self) -> bool {
        self.0.eq_ignore_ascii_case(ZERO_ADDRESS)
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Mutating ledger operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Block value-moving operations (owner only)
    Pause,
    /// Lift the pause (owner only)
    Unpause,
    /// Hand the admin role to another account (owner only)
    TransferOwnership {
        /// Next owner
        new_owner: AccountId,
    },
    /// Create tokens on the owner's balance
    Mint {
        /// Base units to create
        amount: Amount,
    },
    /// Destroy tokens from the caller's balance
    Burn {
        /// Base units to destroy
        amount: Amount,
    },
    /// Move tokens from the caller
    Transfer {
        /// Recipient
        to: AccountId,
        /// Base units to move
        amount: Amount,
    },
    /// Set the spender's allowance over the caller's funds
    Approve {
        /// Delegated spender
        spender: AccountId,
        /// New allowance
        amount: Amount,
    },
    /// Add to the spender's allowance
    IncreaseAllowance {
        /// Delegated spender
        spender: AccountId,
        /// Amount added
        delta: Amount,
    },
    /// Subtract from the spender's allowance
    DecreaseAllowance {
        /// Delegated spender
        spender: AccountId,
        /// Amount removed
        delta: Amount,
    },
    /// Move tokens out of `from` using the caller's allowance
    TransferFrom {
        /// Funds holder
        from: AccountId,
        /// Recipient
        to: AccountId,
        /// Base units to move
        amount: Amount,
    },
    /// One-time self-service mint of the faucet amount
    ClaimFaucet,
}

impl Command {
    /// Stable operation label (used for logs and metrics)
    pub fn name(&self) -> &'static str {
        match self {
            Command::Pause => "pause",
            Command::Unpause => "unpause",
            Command::TransferOwnership { .. } => "transfer_ownership",
            Command::Mint { .. } => "mint",
            Command::Burn { .. } => "burn",
            Command::Transfer { .. } => "transfer",
            Command::Approve { .. } => "approve",
            Command::IncreaseAllowance { .. } => "increase_allowance",
            Command::DecreaseAllowance { .. } => "decrease_allowance",
            Command::TransferFrom { .. } => "transfer_from",
            Command::ClaimFaucet => "claim_faucet",
        }
    }
}

/// Structured event emitted by a successful mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    /// Tokens created (mint or faucet claim)
    Mint {
        /// Credited account
        to: AccountId,
        /// Base units created
        amount: Amount,
    },
    /// Tokens destroyed
    Burn {
        /// Debited account
        from: AccountId,
        /// Base units destroyed
        amount: Amount,
    },
    /// Tokens moved between accounts
    Transfer {
        /// Debited account
        from: AccountId,
        /// Credited account
        to: AccountId,
        /// Base units moved
        amount: Amount,
    },
    /// Allowance set to a new value
    Approval {
        /// Funds holder
        owner: AccountId,
        /// Delegated spender
        spender: AccountId,
        /// Allowance after the operation
        amount: Amount,
    },
    /// Admin role handed over
    OwnershipTransferred {
        /// Previous owner
        previous_owner: AccountId,
        /// New owner
        new_owner: AccountId,
    },
    /// Ledger paused
    Paused {
        /// Owner that paused
        account: AccountId,
    },
    /// Ledger unpaused
    Unpaused {
        /// Owner that unpaused
        account: AccountId,
    },
}

/// Event record as delivered to sinks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Unique event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// Ledger sequence number of the mutation that emitted it
    pub sequence: u64,

    /// Emission timestamp (nanoseconds since Unix epoch)
    pub timestamp_nanos: i64,

    /// Event payload
    pub event: TokenEvent,
}

impl LedgerEvent {
    /// Stamp a payload with a fresh ID and the current time
    pub fn new(sequence: u64, event: TokenEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            sequence,
            timestamp_nanos: chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0),
            event,
        }
    }
}

/// Result of a successful mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Ledger sequence after the mutation
    pub sequence: u64,

    /// Events emitted by the mutation
    pub events: Vec<LedgerEvent>,
}

impl Receipt {
    /// Payloads of the emitted events
    pub fn payloads(&self) -> impl Iterator<Item = &TokenEvent> {
        self.events.iter().map(|e| &e.event)
    }
}
