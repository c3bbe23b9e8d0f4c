//! Error types for the ledger

use crate::types::{AccountId, Amount};
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Guard failures (everything from `Paused` to `ArithmeticOverflow`) abort the
/// operation before any state is touched. The display strings start with the
/// fixed messages callers match on.
#[derive(Error, Debug)]
pub enum Error {
    /// Value-moving operation attempted while the ledger is paused
    #[error("Contract is paused")]
    Paused,

    /// Owner-gated operation attempted by another account
    #[error("Only owner can perform this action (caller {caller})")]
    NotOwner {
        /// Account that attempted the call
        caller: AccountId,
    },

    /// Mint or faucet claim would push total supply past the cap
    #[error("Cap exceeded: total supply {total_supply} + {amount} > cap {cap}")]
    CapExceeded {
        /// Supply before the operation
        total_supply: Amount,
        /// Amount requested
        amount: Amount,
        /// Immutable supply cap
        cap: Amount,
    },

    /// Debit larger than the account balance
    #[error("Insufficient balance{}: {account} holds {available}, needs {required}", burn_suffix(.burning))]
    InsufficientBalance {
        /// Account being debited
        account: AccountId,
        /// Current balance
        available: Amount,
        /// Amount requested
        required: Amount,
        /// Whether the debit came from a burn
        burning: bool,
    },

    /// Delegated transfer larger than the remaining allowance
    #[error("Insufficient allowance: {spender} may move {available} from {owner}, needs {required}")]
    InsufficientAllowance {
        /// Funds holder
        owner: AccountId,
        /// Delegated spender
        spender: AccountId,
        /// Remaining allowance
        available: Amount,
        /// Amount requested
        required: Amount,
    },

    /// `decrease_allowance` would take the allowance below zero
    #[error("Decreased allowance below zero: allowance {available}, decrease {requested}")]
    AllowanceUnderflow {
        /// Current allowance
        available: Amount,
        /// Requested decrease
        requested: Amount,
    },

    /// Second faucet claim by the same account
    #[error("Already claimed faucet ({account})")]
    AlreadyClaimed {
        /// Claiming account
        account: AccountId,
    },

    /// Malformed account identity or construction parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Checked arithmetic overflowed
    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn burn_suffix(burning: &bool) -> &'static str {
    if *burning {
        " to burn"
    } else {
        ""
    }
}

impl Error {
    /// Stable snake_case label for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Paused => "paused",
            Error::NotOwner { .. } => "not_owner",
            Error::CapExceeded { .. } => "cap_exceeded",
            Error::InsufficientBalance { .. } => "insufficient_balance",
            Error::InsufficientAllowance { .. } => "insufficient_allowance",
            Error::AllowanceUnderflow { .. } => "allowance_underflow",
            Error::AlreadyClaimed { .. } => "already_claimed",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::ArithmeticOverflow(_) => "arithmetic_overflow",
            Error::Concurrency(_) => "concurrency",
            Error::Config(_) => "config",
            Error::Serialization(_) => "serialization",
            Error::Io(_) => "io",
        }
    }

    /// Whether this is a ledger guard rejection rather than a host failure
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            Error::Concurrency(_) | Error::Config(_) | Error::Serialization(_) | Error::Io(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
