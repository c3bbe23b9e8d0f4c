//! Standalone token ledger host
//!
//! Reads one JSON request per line on stdin and writes one JSON response per
//! line on stdout. Logs go to stderr.
//!
//! ```text
//! {"execute":{"caller":"0xf39F…","command":{"transfer":{"to":"0x7099…","amount":50}}}}
//! {"balance_of":{"account":"0x7099…"}}
//! "info"
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use token_ledger::{
    AccountId, ActorOptions, Amount, Command, Config, LedgerHandle, LedgerSnapshot, Metrics,
    Receipt, TokenInfo, TracingSink,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Request {
    Execute { caller: AccountId, command: Command },
    BalanceOf { account: AccountId },
    Allowance { owner: AccountId, spender: AccountId },
    Info,
    Snapshot,
    Metrics,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Reply {
    Receipt(Receipt),
    Amount(Amount),
    Info(TokenInfo),
    Snapshot(LedgerSnapshot),
    Metrics(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Response {
    Ok(Reply),
    Error { kind: String, message: String },
}

impl From<token_ledger::Result<Reply>> for Response {
    fn from(result: token_ledger::Result<Reply>) -> Self {
        match result {
            Ok(reply) => Response::Ok(reply),
            Err(e) => Response::Error {
                kind: e.kind().to_string(),
                message: e.to_string(),
            },
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    match std::env::var("TOKEN_LEDGER_CONFIG") {
        Ok(path) => {
            Config::from_file(&path).with_context(|| format!("loading config from {}", path))
        }
        Err(_) => Config::from_env().context("loading config from environment"),
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn handle_request(
    ledger: &LedgerHandle,
    metrics: &Metrics,
    request: Request,
) -> token_ledger::Result<Reply> {
    let reply = match request {
        Request::Execute { caller, command } => Reply::Receipt(ledger.execute(&caller, command).await?),
        Request::BalanceOf { account } => Reply::Amount(ledger.balance_of(&account).await?),
        Request::Allowance { owner, spender } => {
            Reply::Amount(ledger.allowance(&owner, &spender).await?)
        }
        Request::Info => Reply::Info(ledger.info().await?),
        Request::Snapshot => Reply::Snapshot(ledger.snapshot().await?),
        Request::Metrics => Reply::Metrics(metrics.encode()),
    };
    Ok(reply)
}

async fn handle_line(ledger: &LedgerHandle, metrics: &Metrics, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return Response::from(Err(token_ledger::Error::from(e))),
    };
    Response::from(handle_request(ledger, metrics, request).await)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        "Starting token ledger"
    );

    let metrics = Metrics::new().context("creating metrics registry")?;
    let options = ActorOptions::from_config(&config)
        .with_sink(Arc::new(TracingSink))
        .with_metrics(metrics.clone());
    let ledger = LedgerHandle::open(&config, options)?;
    tracing::info!(symbol = %config.token.symbol, owner = %config.token.deployer, "Ledger opened");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let response = handle_line(&ledger, &metrics, &line).await;
                let mut encoded = serde_json::to_vec(&response)?;
                encoded.push(b'\n');
                stdout.write_all(&encoded).await?;
                stdout.flush().await?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    tracing::info!("Shutting down token ledger");
    ledger.shutdown().await?;
    Ok(())
}
