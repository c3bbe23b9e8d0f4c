//! Token ledger state machine
//!
//! `Ledger` owns every piece of token state and applies operations
//! synchronously. Each mutating operation runs its guards first, in a fixed
//! order (pause, authorization, argument validity, then balance, allowance or
//! cap), and only touches state once every guard has passed. A rejected call
//! therefore leaves the ledger exactly as it was.
//!
//! # Example
//!
//! ```
//! use token_ledger::{AccountId, Ledger, TokenParams};
//!
//! # fn main() -> token_ledger::Result<()> {
//! let owner = AccountId::parse("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")?;
//! let alice = AccountId::parse("0x70997970C51812dc3A010C7d01b50e0d17dc79C8")?;
//!
//! let mut ledger = Ledger::new(owner.clone(), TokenParams::default())?;
//! ledger.transfer(&owner, alice.clone(), 50)?;
//! assert_eq!(ledger.balance_of(&alice), 50);
//! # Ok(())
//! # }
//! ```

use crate::{
    types::{AccountId, Amount, Command, LedgerEvent, Receipt, TokenEvent},
    units, Error, Result,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Construction parameters, in display units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParams {
    /// Token name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Decimal places of one display unit
    pub decimals: u8,
    /// Supply credited to the deployer, in display units
    pub initial_supply: u64,
    /// Supply cap, in display units
    pub cap: u64,
    /// Faucet grant, in display units
    pub faucet_amount: u64,
}

impl Default for TokenParams {
    fn default() -> Self {
        Self {
            name: "Lumix Token".to_string(),
            symbol: "LMX".to_string(),
            decimals: 18,
            initial_supply: 10_000,
            cap: 100_000,
            faucet_amount: 10,
        }
    }
}

/// Scalar read-only view of the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    /// Supply cap (base units)
    pub cap: Amount,
    /// Faucet grant (base units)
    pub faucet_amount: Amount,
    /// Current supply (base units)
    pub total_supply: Amount,
    /// Pause flag
    pub paused: bool,
    /// Current administrator
    pub owner: AccountId,
    /// Number of applied mutations
    pub sequence: u64,
}

/// Full, ordered copy of the ledger state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Scalar fields
    pub info: TokenInfo,
    /// Non-zero balances
    pub balances: BTreeMap<AccountId, Amount>,
    /// Non-zero allowances keyed by (owner, spender)
    pub allowances: BTreeMap<AccountId, BTreeMap<AccountId, Amount>>,
    /// Accounts that claimed the faucet
    pub faucet_claimed: BTreeSet<AccountId>,
}

impl LedgerSnapshot {
    /// SHA-256 over the canonical bincode encoding
    pub fn state_digest(&self) -> Result<[u8; 32]> {
        let bytes = bincode::serialize(self)?;
        Ok(Sha256::digest(&bytes).into())
    }

    /// Sum of all balances, `None` on overflow
    pub fn balance_sum(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(0u128, |acc, balance| acc.checked_add(*balance))
    }
}

/// Capped, pausable token ledger
#[derive(Debug, Clone)]
pub struct Ledger {
    name: String,
    symbol: String,
    decimals: u8,
    cap: Amount,
    faucet_amount: Amount,
    owner: AccountId,
    paused: bool,
    total_supply: Amount,
    balances: HashMap<AccountId, Amount>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
    faucet_claimed: HashSet<AccountId>,
    sequence: u64,
}

impl Ledger {
    /// Create a ledger owned by `deployer`, who receives the initial supply
    pub fn new(deployer: AccountId, params: TokenParams) -> Result<Self> {
        deployer.validate()?;

        if params.initial_supply > params.cap {
            return Err(Error::InvalidArgument(format!(
                "initial supply {} exceeds cap {}",
                params.initial_supply, params.cap
            )));
        }

        let initial_supply = units::scale(params.initial_supply, params.decimals)?;
        let cap = units::scale(params.cap, params.decimals)?;
        let faucet_amount = units::scale(params.faucet_amount, params.decimals)?;

        let mut balances = HashMap::new();
        if initial_supply > 0 {
            balances.insert(deployer.clone(), initial_supply);
        }

        tracing::info!(
            name = %params.name,
            symbol = %params.symbol,
            decimals = params.decimals,
            owner = %deployer,
            total_supply = %initial_supply,
            cap = %cap,
            "Token ledger created"
        );

        Ok(Self {
            name: params.name,
            symbol: params.symbol,
            decimals: params.decimals,
            cap,
            faucet_amount,
            owner: deployer,
            paused: false,
            total_supply: initial_supply,
            balances,
            allowances: HashMap::new(),
            faucet_claimed: HashSet::new(),
            sequence: 0,
        })
    }

    // ---- reads ----

    /// Token name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticker symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Decimal places
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Supply cap in base units
    pub fn cap(&self) -> Amount {
        self.cap
    }

    /// Faucet grant in base units
    pub fn faucet_amount(&self) -> Amount {
        self.faucet_amount
    }

    /// Current supply in base units
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Balance of `account` (0 if never credited)
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Amount `spender` may move out of `owner`'s balance
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Pause flag
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current administrator
    pub fn contract_owner(&self) -> &AccountId {
        &self.owner
    }

    /// Whether `account` already claimed the faucet
    pub fn has_claimed_faucet(&self, account: &AccountId) -> bool {
        self.faucet_claimed.contains(account)
    }

    /// Number of successfully applied mutations
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// All scalar reads at once
    pub fn info(&self) -> TokenInfo {
        TokenInfo {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            cap: self.cap,
            faucet_amount: self.faucet_amount,
            total_supply: self.total_supply,
            paused: self.paused,
            owner: self.owner.clone(),
            sequence: self.sequence,
        }
    }

    /// Ordered copy of the whole state
    pub fn snapshot(&self) -> LedgerSnapshot {
        let balances = self
            .balances
            .iter()
            .filter(|(_, balance)| **balance > 0)
            .map(|(account, balance)| (account.clone(), *balance))
            .collect();

        let mut allowances: BTreeMap<AccountId, BTreeMap<AccountId, Amount>> = BTreeMap::new();
        for ((owner, spender), amount) in &self.allowances {
            if *amount > 0 {
                allowances
                    .entry(owner.clone())
                    .or_default()
                    .insert(spender.clone(), *amount);
            }
        }

        LedgerSnapshot {
            info: self.info(),
            balances,
            allowances,
            faucet_claimed: self.faucet_claimed.iter().cloned().collect(),
        }
    }

    // ---- mutations ----

    /// Apply a command on behalf of `caller`
    pub fn execute(&mut self, caller: &AccountId, command: Command) -> Result<Receipt> {
        let operation = command.name();
        let result = match command {
            Command::Pause => self.pause(caller),
            Command::Unpause => self.unpause(caller),
            Command::TransferOwnership { new_owner } => self.transfer_ownership(caller, new_owner),
            Command::Mint { amount } => self.mint(caller, amount),
            Command::Burn { amount } => self.burn(caller, amount),
            Command::Transfer { to, amount } => self.transfer(caller, to, amount),
            Command::Approve { spender, amount } => self.approve(caller, spender, amount),
            Command::IncreaseAllowance { spender, delta } => {
                self.increase_allowance(caller, spender, delta)
            }
            Command::DecreaseAllowance { spender, delta } => {
                self.decrease_allowance(caller, spender, delta)
            }
            Command::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, from, to, amount)
            }
            Command::ClaimFaucet => self.claim_faucet(caller),
        };

        match &result {
            Ok(receipt) => {
                tracing::debug!(operation, caller = %caller, sequence = receipt.sequence, "Operation applied");
            }
            Err(e) => {
                tracing::warn!(operation, caller = %caller, kind = e.kind(), "Operation rejected: {}", e);
            }
        }

        result
    }

    /// Block value-moving operations. Owner only; allowed while paused.
    pub fn pause(&mut self, caller: &AccountId) -> Result<Receipt> {
        self.ensure_owner(caller)?;

        self.paused = true;
        Ok(self.commit(TokenEvent::Paused {
            account: caller.clone(),
        }))
    }

    /// Lift the pause. Owner only.
    pub fn unpause(&mut self, caller: &AccountId) -> Result<Receipt> {
        self.ensure_owner(caller)?;

        self.paused = false;
        Ok(self.commit(TokenEvent::Unpaused {
            account: caller.clone(),
        }))
    }

    /// Hand the admin role to `new_owner`. Owner only; allowed while paused.
    pub fn transfer_ownership(&mut self, caller: &AccountId, new_owner: AccountId) -> Result<Receipt> {
        self.ensure_owner(caller)?;
        new_owner.validate()?;

        let previous_owner = std::mem::replace(&mut self.owner, new_owner.clone());
        Ok(self.commit(TokenEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        }))
    }

    /// Create `amount` base units on the owner's balance
    pub fn mint(&mut self, caller: &AccountId, amount: Amount) -> Result<Receipt> {
        self.ensure_not_paused()?;
        self.ensure_owner(caller)?;
        let total_supply = self.checked_supply_increase(amount)?;
        let balance = self.checked_credit(caller, amount)?;

        self.total_supply = total_supply;
        self.balances.insert(caller.clone(), balance);
        Ok(self.commit(TokenEvent::Mint {
            to: caller.clone(),
            amount,
        }))
    }

    /// Destroy `amount` base units from the caller's balance
    pub fn burn(&mut self, caller: &AccountId, amount: Amount) -> Result<Receipt> {
        self.ensure_not_paused()?;
        let balance = self.checked_debit(caller, amount, true)?;

        self.set_balance(caller, balance);
        // Supply covers every balance, so this cannot underflow.
        self.total_supply -= amount;
        Ok(self.commit(TokenEvent::Burn {
            from: caller.clone(),
            amount,
        }))
    }

    /// Move `amount` base units from the caller to `to`
    pub fn transfer(&mut self, caller: &AccountId, to: AccountId, amount: Amount) -> Result<Receipt> {
        self.ensure_not_paused()?;
        to.validate()?;
        self.move_funds(caller, &to, amount)?;

        Ok(self.commit(TokenEvent::Transfer {
            from: caller.clone(),
            to,
            amount,
        }))
    }

    /// Set `spender`'s allowance over the caller's funds to exactly `amount`
    pub fn approve(&mut self, caller: &AccountId, spender: AccountId, amount: Amount) -> Result<Receipt> {
        self.ensure_not_paused()?;
        spender.validate()?;

        self.set_allowance(caller, &spender, amount);
        Ok(self.commit(TokenEvent::Approval {
            owner: caller.clone(),
            spender,
            amount,
        }))
    }

    /// Add `delta` to `spender`'s allowance
    pub fn increase_allowance(
        &mut self,
        caller: &AccountId,
        spender: AccountId,
        delta: Amount,
    ) -> Result<Receipt> {
        self.ensure_not_paused()?;
        spender.validate()?;
        let current = self.allowance(caller, &spender);
        let amount = current.checked_add(delta).ok_or_else(|| {
            Error::ArithmeticOverflow(format!("allowance {} + {}", current, delta))
        })?;

        self.set_allowance(caller, &spender, amount);
        Ok(self.commit(TokenEvent::Approval {
            owner: caller.clone(),
            spender,
            amount,
        }))
    }

    /// Subtract `delta` from `spender`'s allowance
    pub fn decrease_allowance(
        &mut self,
        caller: &AccountId,
        spender: AccountId,
        delta: Amount,
    ) -> Result<Receipt> {
        self.ensure_not_paused()?;
        spender.validate()?;
        let current = self.allowance(caller, &spender);
        let amount = current.checked_sub(delta).ok_or(Error::AllowanceUnderflow {
            available: current,
            requested: delta,
        })?;

        self.set_allowance(caller, &spender, amount);
        Ok(self.commit(TokenEvent::Approval {
            owner: caller.clone(),
            spender,
            amount,
        }))
    }

    /// Move `amount` from `from` to `to`, spending the caller's allowance
    pub fn transfer_from(
        &mut self,
        caller: &AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<Receipt> {
        self.ensure_not_paused()?;
        from.validate()?;
        to.validate()?;
        let allowance = self.allowance(&from, caller);
        let remaining = allowance
            .checked_sub(amount)
            .ok_or_else(|| Error::InsufficientAllowance {
                owner: from.clone(),
                spender: caller.clone(),
                available: allowance,
                required: amount,
            })?;
        self.move_funds(&from, &to, amount)?;

        self.set_allowance(&from, caller, remaining);
        Ok(self.commit(TokenEvent::Transfer { from, to, amount }))
    }

    /// Credit the faucet amount to a caller that has never claimed before
    pub fn claim_faucet(&mut self, caller: &AccountId) -> Result<Receipt> {
        self.ensure_not_paused()?;
        caller.validate()?;
        if self.faucet_claimed.contains(caller) {
            return Err(Error::AlreadyClaimed {
                account: caller.clone(),
            });
        }
        let amount = self.faucet_amount;
        let total_supply = self.checked_supply_increase(amount)?;
        let balance = self.checked_credit(caller, amount)?;

        self.total_supply = total_supply;
        self.balances.insert(caller.clone(), balance);
        self.faucet_claimed.insert(caller.clone());
        Ok(self.commit(TokenEvent::Mint {
            to: caller.clone(),
            amount,
        }))
    }

    // ---- guards ----

    fn ensure_not_paused(&self) -> Result<()> {
        if self.paused {
            return Err(Error::Paused);
        }
        Ok(())
    }

    fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        if *caller != self.owner {
            return Err(Error::NotOwner {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    fn checked_supply_increase(&self, amount: Amount) -> Result<Amount> {
        let total_supply = self.total_supply.checked_add(amount).ok_or_else(|| {
            Error::ArithmeticOverflow(format!("total supply {} + {}", self.total_supply, amount))
        })?;
        if total_supply > self.cap {
            return Err(Error::CapExceeded {
                total_supply: self.total_supply,
                amount,
                cap: self.cap,
            });
        }
        Ok(total_supply)
    }

    fn checked_credit(&self, account: &AccountId, amount: Amount) -> Result<Amount> {
        let balance = self.balance_of(account);
        balance.checked_add(amount).ok_or_else(|| {
            Error::ArithmeticOverflow(format!("balance of {} {} + {}", account, balance, amount))
        })
    }

    fn checked_debit(&self, account: &AccountId, amount: Amount, burning: bool) -> Result<Amount> {
        let balance = self.balance_of(account);
        balance
            .checked_sub(amount)
            .ok_or_else(|| Error::InsufficientBalance {
                account: account.clone(),
                available: balance,
                required: amount,
                burning,
            })
    }

    // ---- state helpers (called only after every guard passed) ----

    fn move_funds(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        let from_balance = self.checked_debit(from, amount, false)?;
        if from == to {
            return Ok(());
        }
        let to_balance = self.checked_credit(to, amount)?;

        self.set_balance(from, from_balance);
        self.set_balance(to, to_balance);
        Ok(())
    }

    fn set_balance(&mut self, account: &AccountId, balance: Amount) {
        if balance == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.clone(), balance);
        }
    }

    fn set_allowance(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount) {
        let key = (owner.clone(), spender.clone());
        if amount == 0 {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    fn commit(&mut self, event: TokenEvent) -> Receipt {
        self.sequence += 1;
        Receipt {
            sequence: self.sequence,
            events: vec![LedgerEvent::new(self.sequence, event)],
        }
    }
}
