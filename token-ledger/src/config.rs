//! Configuration for the ledger

use crate::ledger::TokenParams;
use crate::types::AccountId;
use serde::{Deserialize, Serialize};

/// Hardhat's first default account, used as deployer when none is configured
pub const DEFAULT_DEPLOYER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Actor mailbox capacity (bounded for backpressure)
    pub mailbox_capacity: usize,

    /// Per-subscriber event buffer
    pub event_buffer: usize,

    /// Token deployment parameters
    pub token: TokenConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "token-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            mailbox_capacity: 1000,
            event_buffer: 1024,
            token: TokenConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Token deployment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Account that deploys the ledger and becomes its owner
    pub deployer: String,

    /// Token name
    pub name: String,

    /// Ticker symbol
    pub symbol: String,

    /// Decimal places
    pub decimals: u8,

    /// Initial supply (display units)
    pub initial_supply: u64,

    /// Supply cap (display units)
    pub cap: u64,

    /// Faucet grant (display units)
    pub faucet_amount: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        let params = TokenParams::default();
        Self {
            deployer: DEFAULT_DEPLOYER.to_string(),
            name: params.name,
            symbol: params.symbol,
            decimals: params.decimals,
            initial_supply: params.initial_supply,
            cap: params.cap,
            faucet_amount: params.faucet_amount,
        }
    }
}

impl TokenConfig {
    /// Validated deployer identity
    pub fn deployer(&self) -> crate::Result<AccountId> {
        AccountId::parse(self.deployer.clone())
    }

    /// Construction parameters for `Ledger::new`
    pub fn params(&self) -> TokenParams {
        TokenParams {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            initial_supply: self.initial_supply,
            cap: self.cap,
            faucet_amount: self.faucet_amount,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(deployer) = std::env::var("TOKEN_LEDGER_DEPLOYER") {
            config.token.deployer = deployer;
        }

        if let Ok(name) = std::env::var("TOKEN_LEDGER_NAME") {
            config.token.name = name;
        }

        if let Ok(symbol) = std::env::var("TOKEN_LEDGER_SYMBOL") {
            config.token.symbol = symbol;
        }

        config.token.decimals = env_number("TOKEN_LEDGER_DECIMALS", config.token.decimals)?;
        config.token.initial_supply =
            env_number("TOKEN_LEDGER_INITIAL_SUPPLY", config.token.initial_supply)?;
        config.token.cap = env_number("TOKEN_LEDGER_CAP", config.token.cap)?;
        config.token.faucet_amount =
            env_number("TOKEN_LEDGER_FAUCET_AMOUNT", config.token.faucet_amount)?;
        config.mailbox_capacity = env_number("TOKEN_LEDGER_MAILBOX_CAPACITY", config.mailbox_capacity)?;

        if let Ok(level) = std::env::var("TOKEN_LEDGER_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(json) = std::env::var("TOKEN_LEDGER_LOG_JSON") {
            config.logging.json = matches!(json.as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the ledger cannot start with
    pub fn validate(&self) -> crate::Result<()> {
        if self.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "mailbox_capacity must be positive".to_string(),
            ));
        }
        if self.token.initial_supply > self.token.cap {
            return Err(crate::Error::Config(format!(
                "initial_supply {} exceeds cap {}",
                self.token.initial_supply, self.token.cap
            )));
        }
        self.token
            .deployer()
            .map_err(|e| crate::Error::Config(format!("deployer: {}", e)))?;
        crate::units::scale(self.token.cap, self.token.decimals)
            .map_err(|e| crate::Error::Config(format!("cap: {}", e)))?;
        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(key: &str, default: T) -> crate::Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| crate::Error::Config(format!("{} is not a valid number: {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}
